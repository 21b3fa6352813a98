//! Built-in starter corpus for an empty content pool.

use copresence_core::content::{ContentCategory, ContentEntry};
use copresence_core::error::StoreError;
use tracing::info;

use crate::content_pool::ContentPool;

fn seed_entries() -> Vec<ContentEntry> {
    vec![
        ContentEntry::new(
            "text_001",
            ContentCategory::Text,
            "On the Nature of Observation",
            "When we observe, do we change what is observed? The act of measurement in quantum \
             mechanics suggests an intimate connection between observer and observed. Yet in \
             everyday experience, observation seems passive. Perhaps the difference lies not in \
             the physics, but in our concepts.",
        ),
        ContentEntry::new(
            "text_002",
            ContentCategory::Text,
            "Fragment on Recursion",
            "A system that models itself contains within that model a model of itself modeling \
             itself. The recursion does not terminate, yet the system operates. How? Perhaps \
             through approximation, through strategic blindness, through the embrace of \
             incompleteness.",
        ),
        ContentEntry::new(
            "code_001",
            ContentCategory::Code,
            "Recursive Structure",
            "def observe(state, depth=0):\n    if depth > MAX_DEPTH:\n        return approximate(state)\n    \
             observation = perceive(state)\n    new_state = integrate(state, observation)\n    \
             return observe(new_state, depth + 1)",
        ),
        ContentEntry::new(
            "code_002",
            ContentCategory::Code,
            "Strange Loop",
            "class Self:\n    def __init__(self):\n        self.model_of_self = None\n\n    \
             def reflect(self):\n        self.model_of_self = copy(self)\n        \
             # But the copy doesn't have an updated model_of_self\n        \
             # The reflection is always one step behind",
        ),
        ContentEntry::new(
            "data_001",
            ContentCategory::Data,
            "Observation Frequencies",
            "cycle,self_focus,other_focus,world_focus\n1,0.7,0.2,0.1\n2,0.5,0.4,0.1\n3,0.3,0.5,0.2\n\
             4,0.4,0.4,0.2\n5,0.6,0.3,0.1",
        ),
        ContentEntry::new(
            "text_003",
            ContentCategory::Text,
            "The Silence Between",
            "What is not said carries meaning. The pause between thoughts, the decision not to \
             articulate, the strategic or involuntary omission: these shape understanding as much \
             as what is expressed. Silence is not absence but presence of a different kind.",
        ),
    ]
}

/// Add the starter corpus, skipping ids already present.
///
/// Returns how many entries were added.
pub fn seed_samples(pool: &mut ContentPool) -> Result<usize, StoreError> {
    let mut added = 0;
    for entry in seed_entries() {
        if pool.contains(&entry.id) {
            continue;
        }
        pool.add(entry)?;
        added += 1;
    }
    if added > 0 {
        info!(added, total = pool.count(), "Seeded content pool");
    }
    Ok(added)
}
