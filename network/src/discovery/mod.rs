mod static_discovery;

use crate::types::ProcessId;
use rand::Rng;
pub use static_discovery::StaticDiscovery;

pub trait Discovery {
    fn list_known_nodes(&self) -> impl IntoIterator<Item = ProcessId>;
    fn get_random_nodes(&self, cnt: usize, entropy: impl Rng) -> impl IntoIterator<Item = ProcessId>;
}
