pub mod recency_list;
pub mod ring;

pub use recency_list::{NodeId, RecencyList};
pub use ring::{RingKey, RingRouter};
