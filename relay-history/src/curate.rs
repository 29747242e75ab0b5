//! Curation: derive the model-facing view of a raw history log (§4.3).

use relay_types::{Content, Role};

/// Drop empty or thought-only model turns, together with the user turn(s)
/// that immediately preceded them.
///
/// A model turn that produced nothing the model can build on (no text, no
/// function call — only thoughts, or nothing at all) is not useful context
/// and its prompting user turn is equally dead weight. Turns are grouped by
/// consecutive same-role runs before this rule is applied, since a single
/// logical turn can span several `Content` entries (e.g. a function-call
/// round trip keeps emitting `model` entries).
pub fn curate(raw: &[Content]) -> Vec<Content> {
    let runs = group_runs(raw);
    let mut keep = vec![true; runs.len()];

    for (index, run) in runs.iter().enumerate() {
        if run.role != Role::Model {
            continue;
        }
        let meaningful = run.entries.iter().any(|c| c.has_meaningful_part());
        if meaningful {
            continue;
        }
        keep[index] = false;
        if index > 0 && runs[index - 1].role == Role::User {
            keep[index - 1] = false;
        }
    }

    runs.into_iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .flat_map(|(run, _)| run.entries)
        .collect()
}

struct Run {
    role: Role,
    entries: Vec<Content>,
}

fn group_runs(raw: &[Content]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for content in raw {
        match runs.last_mut() {
            Some(run) if run.role == content.role => run.entries.push(content.clone()),
            _ => runs.push(Run {
                role: content.role,
                entries: vec![content.clone()],
            }),
        }
    }
    runs
}
