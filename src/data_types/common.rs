pub type RouteId = i64;

/// Client-side identity of a stop, assigned once per loaded route. Unlike the stop's
/// position in the list it survives reordering.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

pub trait Identifiable {
    fn route_id(&self) -> RouteId;
}
