pub use crate::builder::{BowMemo, DescriptorMemo, Memo, MemoBuilder, SparseVector, Topology};
pub use crate::ds::{RingKey, RingRouter};
pub use crate::error::{ErrorKind, MemoError};
pub use crate::memo::{MemoCore, OpportunisticMemo, PerWorkerMemo, RingMemo, SingleMemo};
pub use crate::stats::StatsSnapshot;
pub use crate::traits::{MemoCache, WorkerId};
