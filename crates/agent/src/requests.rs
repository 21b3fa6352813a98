//! Profile-driven read-requests.
//!
//! What an agent reads each cycle is a pure function of its preferences and
//! of how much material exists. Attention weights below the threshold mean
//! "do not look".

use copresence_core::profile::AbstractionLevel;
use copresence_core::query::{ArtifactQuery, SortOrder};
use copresence_core::request::{PoolQuery, ReadRequest};
use copresence_core::think::ReadContext;

/// Attention weights below this value request nothing.
pub const ATTENTION_THRESHOLD: f64 = 0.3;

/// A high-abstraction agent samples history only once the log holds more
/// artifacts than this.
pub const HISTORY_SAMPLE_MIN_LOG: usize = 10;

/// Size of the historical sample.
pub const HISTORY_SAMPLE_SIZE: usize = 3;

fn scaled(weight: f64, scale: f64) -> usize {
    ((scale * weight).floor() as usize).max(1)
}

/// Declare this cycle's read-requests for `self_name`, in order:
/// recent own traces, recent counterpart traces, a historical sample,
/// and a random pool sample.
pub fn profile_read_requests(self_name: &str, other_name: &str, ctx: ReadContext<'_>) -> Vec<ReadRequest> {
    let p = ctx.preferences;
    let mut requests = Vec::new();

    if p.self_focus >= ATTENTION_THRESHOLD {
        requests.push(ReadRequest::log(
            "recent_self",
            ArtifactQuery::new()
                .agent(self_name)
                .limit(scaled(p.self_focus, 5.0))
                .order(SortOrder::Desc),
        ));
    }

    if p.other_focus >= ATTENTION_THRESHOLD {
        requests.push(ReadRequest::log(
            "recent_other",
            ArtifactQuery::new()
                .agent(other_name)
                .limit(scaled(p.other_focus, 5.0))
                .order(SortOrder::Desc),
        ));
    }

    if p.abstraction_level == AbstractionLevel::High && ctx.log_count > HISTORY_SAMPLE_MIN_LOG {
        requests.push(ReadRequest::log(
            "historical_sample",
            ArtifactQuery::new().sample(HISTORY_SAMPLE_SIZE),
        ));
    }

    if ctx.pool_available && p.world_focus >= ATTENTION_THRESHOLD {
        requests.push(ReadRequest::pool(
            "random_world",
            PoolQuery::Sample {
                category: None,
                n: scaled(p.world_focus, 3.0),
            },
        ));
    }

    requests
}
