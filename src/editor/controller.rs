use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    data_types::{
        common::{RouteId, StopId},
        route::Route,
    },
    logln, logvbln,
    route_service::{RouteService, ServiceError},
    util::config::{EditorOptions, StaleGeometryPolicy},
};

use super::{
    session::{EditSession, Navigation, Phase, Termination},
    Confirmation, EditorError, RecalculateStage, RouteField,
};

const CANCEL_PROMPT: &str = "Discard all changes made to this route?";
const DELETE_PROMPT: &str = "Delete this route permanently?";

struct ControllerState {
    phase: Phase,
    // Bumped when the session is abandoned; responses dispatched under an older
    // generation are dropped.
    generation: u64,
    session: Option<EditSession>,
    last_error: Option<EditorError>,
}

/// Drives one editing session of a draft route: load, local edits, recalculation,
/// save, cancel and delete.
///
/// Local edits are synchronous. Calls that write to the service are queued behind a
/// single gate, so at most one of them is in flight per session.
pub struct RouteDraftController {
    route_id: RouteId,
    service: Arc<dyn RouteService>,
    options: EditorOptions,
    state: Mutex<ControllerState>,
    write_gate: tokio::sync::Mutex<()>,
}

impl RouteDraftController {
    const CC: &'static str = "RouteDraftController";

    pub fn new(service: Arc<dyn RouteService>, route_id: RouteId, options: EditorOptions) -> Self {
        Self {
            route_id,
            service,
            options,
            state: Mutex::new(ControllerState {
                phase: Phase::Loading,
                generation: 0,
                session: None,
                last_error: None,
            }),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn route_id(&self) -> RouteId {
        self.route_id
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Last failure, kept until dismissed or until the next action starts.
    pub fn last_error(&self) -> Option<EditorError> {
        self.lock().last_error.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().last_error = None;
    }

    /// Read access to the live session, `None` before load and after termination.
    pub fn with_session<R, F: FnOnce(&EditSession) -> R>(&self, f: F) -> Option<R> {
        self.lock().session.as_ref().map(f)
    }

    pub fn current(&self) -> Option<Route> {
        self.with_session(|session| session.current().clone())
    }

    pub fn is_geometry_dirty(&self) -> bool {
        self.with_session(EditSession::is_geometry_dirty)
            .unwrap_or(false)
    }

    /// Fetches the route and opens the session. A body for another route id is refused.
    /// Can be retried after a failure.
    pub async fn load(&self) -> Result<(), EditorError> {
        let _gate = self.write_gate.lock().await;

        let generation = {
            let mut state = self.lock();
            if state.phase != Phase::Loading {
                return Err(EditorError::NotReady(state.phase));
            }
            state.last_error = None;
            state.generation
        };

        logln!("Loading route {}", self.route_id);
        let result = self.service.get_route(self.route_id).await;

        let mut state = self.settle(generation)?;
        match result {
            Ok(route) if route.id != self.route_id => {
                let mismatch = ServiceError::Json(format!(
                    "asked for route {} but the service sent route {}",
                    self.route_id, route.id
                ));
                Err(self.fail(&mut state, EditorError::LoadFailed(mismatch)))
            }
            Ok(route) => {
                let session = EditSession::start(route);
                logvbln!(
                    "Route {} loaded: {} stops, {} active",
                    self.route_id,
                    session.current().stops.len(),
                    session.current().active_stops().len()
                );

                state.session = Some(session);
                state.phase = Phase::Ready;
                Ok(())
            }
            Err(e) => Err(self.fail(&mut state, EditorError::LoadFailed(e))),
        }
    }

    pub fn edit_field(&self, field: RouteField) -> Result<(), EditorError> {
        let mut state = self.lock();
        let session = RouteDraftController::ready_session(&mut state)?;

        field.apply(session.current_mut());
        Ok(())
    }

    /// Includes or excludes a stop. The geometry is stale until the next recalculation.
    pub fn toggle_stop(&self, stop: StopId, selected: bool) -> Result<(), EditorError> {
        let mut state = self.lock();
        let session = RouteDraftController::ready_session(&mut state)?;

        if session.current_mut().toggle_stop(stop, selected)? {
            session.mark_geometry_dirty();
        }
        Ok(())
    }

    /// Same as [`toggle_stop`](Self::toggle_stop), addressed by position in the stop list.
    pub fn toggle_stop_at(&self, index: usize, selected: bool) -> Result<(), EditorError> {
        let mut state = self.lock();
        let session = RouteDraftController::ready_session(&mut state)?;

        if session.current_mut().toggle(index, selected)? {
            session.mark_geometry_dirty();
        }
        Ok(())
    }

    /// Writes the current route, then asks the service for the geometry of the persisted
    /// selection. Returns the new distance in kilometers.
    pub async fn recalculate(&self) -> Result<f64, EditorError> {
        self.ensure_open()?;
        let _gate = self.write_gate.lock().await;

        let (generation, payload) =
            self.begin(Phase::Recalculating, |session| session.current().clone())?;
        let route_id = payload.id;

        logln!("Recalculating route {}", route_id);

        if let Err(e) = self.service.put_route(payload).await {
            let mut state = self.settle(generation)?;
            state.phase = Phase::Ready;
            return Err(self.fail(
                &mut state,
                EditorError::RecalculateFailed {
                    stage: RecalculateStage::Persist,
                    source: e,
                },
            ));
        }

        drop(self.settle(generation)?);
        let result = self.service.recalculate(route_id).await;

        let mut state = self.settle(generation)?;
        state.phase = Phase::Ready;

        match result {
            Ok(recalculated) => {
                let distance_km = recalculated.distance_km;
                if let Some(session) = state.session.as_mut() {
                    session.apply_geometry(recalculated.encoded_polyline, distance_km);
                }

                logln!("Route {} recalculated: {:.1} km", route_id, distance_km);
                Ok(distance_km)
            }
            Err(e) => Err(self.fail(
                &mut state,
                EditorError::RecalculateFailed {
                    stage: RecalculateStage::Recompute,
                    source: e,
                },
            )),
        }
    }

    /// Persists the route as it is and closes the session.
    pub async fn save(&self) -> Result<Navigation, EditorError> {
        self.ensure_open()?;
        let _gate = self.write_gate.lock().await;

        {
            let mut state = self.lock();
            let dirty = state.phase == Phase::Ready
                && state
                    .session
                    .as_ref()
                    .map(EditSession::is_geometry_dirty)
                    .unwrap_or(false);

            if dirty {
                match self.options.stale_geometry {
                    StaleGeometryPolicy::Block => {
                        return Err(self.fail(&mut state, EditorError::StaleGeometry));
                    }
                    StaleGeometryPolicy::Warn => {
                        logln!(
                            "Saving route {} with a path that predates the stop selection",
                            self.route_id
                        );
                    }
                }
            }
        }

        let (generation, payload) =
            self.begin(Phase::Saving, |session| session.current().clone())?;

        logln!("Saving route {}", self.route_id);
        let result = self.service.put_route(payload).await;

        let mut state = self.settle(generation)?;
        match result {
            Ok(()) => {
                self.terminate(&mut state, Termination::Saved);
                Ok(Navigation::Preview(self.route_id))
            }
            Err(e) => {
                state.phase = Phase::Ready;
                Err(self.fail(&mut state, EditorError::SaveFailed(e)))
            }
        }
    }

    /// Discards every edit by restoring the snapshot and writing it back, which also
    /// undoes stops persisted by an earlier recalculation.
    ///
    /// The local revert happens before the write. If the write fails the session stays
    /// `Ready` holding the reverted route, and calling `cancel` again retries the write.
    pub async fn cancel(&self, confirmation: &dyn Confirmation) -> Result<Navigation, EditorError> {
        self.ensure_open()?;

        if !confirmation.confirm(CANCEL_PROMPT) {
            return Ok(Navigation::Stay);
        }

        let _gate = self.write_gate.lock().await;

        let (generation, payload) = self.begin(Phase::Cancelling, |session| {
            session.revert_to_snapshot();
            session.current().clone()
        })?;

        logln!("Reverting route {} to its loaded state", self.route_id);
        let result = self.service.put_route(payload).await;

        let mut state = self.settle(generation)?;
        match result {
            Ok(()) => {
                self.terminate(&mut state, Termination::Cancelled);
                Ok(Navigation::Preview(self.route_id))
            }
            Err(e) => {
                state.phase = Phase::Ready;
                Err(self.fail(&mut state, EditorError::CancelPersistFailed(e)))
            }
        }
    }

    /// Deletes the route being edited. On failure the route and the session are intact.
    pub async fn delete(&self, confirmation: &dyn Confirmation) -> Result<Navigation, EditorError> {
        self.ensure_open()?;

        if !confirmation.confirm(DELETE_PROMPT) {
            return Ok(Navigation::Stay);
        }

        let _gate = self.write_gate.lock().await;
        let (generation, _) = self.begin(Phase::Deleting, |session| session.current().clone())?;

        logln!("Deleting route {}", self.route_id);
        let result = self.service.delete_route(self.route_id).await;

        let mut state = self.settle(generation)?;
        match result {
            Ok(()) => {
                self.terminate(&mut state, Termination::Deleted);
                Ok(Navigation::RouteList)
            }
            Err(e) => {
                state.phase = Phase::Ready;
                Err(self.fail(&mut state, EditorError::DeleteFailed(e)))
            }
        }
    }

    /// The user left the editor. Whatever is in flight completes on the server but its
    /// response is ignored here.
    pub fn abandon(&self) {
        let mut state = self.lock();
        if state.phase.is_terminated() {
            return;
        }

        logvbln!("Abandoning session for route {} in {:?}", self.route_id, state.phase);
        state.generation += 1;
        self.terminate(&mut state, Termination::Abandoned);
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready_session(state: &mut ControllerState) -> Result<&mut EditSession, EditorError> {
        if state.phase != Phase::Ready {
            return Err(EditorError::NotReady(state.phase));
        }

        state
            .session
            .as_mut()
            .ok_or(EditorError::NotReady(state.phase))
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        let phase = self.lock().phase;
        if phase.is_terminated() {
            return Err(EditorError::NotReady(phase));
        }

        Ok(())
    }

    // Moves Ready -> `phase` and builds the request payload under the same lock.
    fn begin<F>(&self, phase: Phase, payload: F) -> Result<(u64, Route), EditorError>
    where
        F: FnOnce(&mut EditSession) -> Route,
    {
        let mut state = self.lock();
        let generation = state.generation;
        let session = RouteDraftController::ready_session(&mut state)?;
        let payload = payload(session);

        state.phase = phase;
        state.last_error = None;

        Ok((generation, payload))
    }

    // Re-enters the session after a network call, unless it was abandoned meanwhile.
    fn settle(&self, generation: u64) -> Result<MutexGuard<'_, ControllerState>, EditorError> {
        let state = self.lock();
        if state.generation != generation {
            logvbln!("Dropping late response for route {}", self.route_id);
            return Err(EditorError::SessionAbandoned);
        }

        Ok(state)
    }

    fn terminate(&self, state: &mut ControllerState, termination: Termination) {
        state.phase = Phase::Terminated(termination);
        state.session = None;
        state.last_error = None;
        logvbln!("Session for route {} ended: {:?}", self.route_id, termination);
    }

    fn fail(&self, state: &mut ControllerState, error: EditorError) -> EditorError {
        logln!("Route {}: {}", self.route_id, error);
        state.last_error = Some(error.clone());
        error
    }
}

/// Deletes a route outside of any editing session, e.g. from the route list.
pub async fn delete_route(
    service: &dyn RouteService,
    route_id: RouteId,
    confirmation: &dyn Confirmation,
) -> Result<Navigation, EditorError> {
    if !confirmation.confirm(DELETE_PROMPT) {
        return Ok(Navigation::Stay);
    }

    service
        .delete_route(route_id)
        .await
        .map(|_| Navigation::RouteList)
        .map_err(EditorError::DeleteFailed)
}
