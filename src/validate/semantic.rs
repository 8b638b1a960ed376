use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::draft::{CountryDraft, MonarchForm, PresidentForm};
use crate::models::dates::{parse_date, parse_instant};
use crate::models::EventType;

use super::describe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    President,
    Monarch,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::President => "President",
            Self::Monarch => "Monarch",
        }
    }
}

/// An advisory plausibility finding.
///
/// `position` fields are 1-based. Warnings never block a save; they are shown
/// alongside, and distinct from, structural errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticWarning {
    DeathBeforeBirth {
        role: Role,
        position: usize,
        name: String,
        birth: NaiveDate,
        death: NaiveDate,
    },
    EventBeforeBirth {
        position: usize,
        name: String,
        event_position: usize,
        date: NaiveDate,
        birth: NaiveDate,
    },
    EventAfterDeath {
        position: usize,
        name: String,
        event_position: usize,
        date: NaiveDate,
        death: NaiveDate,
    },
    TermOverlap {
        predecessor: String,
        successor: String,
        predecessor_end: NaiveDate,
        successor_start: NaiveDate,
    },
    ReignEndsBeforeStart {
        position: usize,
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    ReignBeforeBirth {
        position: usize,
        name: String,
        birth: NaiveDate,
        start: NaiveDate,
    },
}

impl fmt::Display for SemanticWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeathBeforeBirth {
                role,
                position,
                name,
                birth,
                death,
            } => write!(
                f,
                "{}: death ({death}) is before birth ({birth})",
                describe(role.as_str(), *position, name)
            ),
            Self::EventBeforeBirth {
                position,
                name,
                event_position,
                date,
                birth,
            } => write!(
                f,
                "{}, event {event_position}: dated {date}, before birth ({birth})",
                describe("President", *position, name)
            ),
            Self::EventAfterDeath {
                position,
                name,
                event_position,
                date,
                death,
            } => write!(
                f,
                "{}, event {event_position}: dated {date}, after death ({death})",
                describe("President", *position, name)
            ),
            Self::TermOverlap {
                predecessor,
                successor,
                predecessor_end,
                successor_start,
            } => write!(
                f,
                "Terms overlap: {predecessor}'s term ends {predecessor_end}, after {successor}'s term begins {successor_start}"
            ),
            Self::ReignEndsBeforeStart {
                position,
                name,
                start,
                end,
            } => write!(
                f,
                "{}: reign ends ({end}) before it starts ({start})",
                describe("Monarch", *position, name)
            ),
            Self::ReignBeforeBirth {
                position,
                name,
                birth,
                start,
            } => write!(
                f,
                "{}: reign starts ({start}) before birth ({birth})",
                describe("Monarch", *position, name)
            ),
        }
    }
}

/// Collect plausibility warnings for `draft`.
///
/// Values that do not parse are skipped here; reporting them is the
/// structural validator's job.
pub fn validate_semantics(draft: &CountryDraft) -> Vec<SemanticWarning> {
    let mut warnings = Vec::new();

    for (index, president) in draft.presidents.iter().enumerate() {
        check_president(index + 1, president, &mut warnings);
    }
    check_term_overlaps(&draft.presidents, &mut warnings);
    for (index, monarch) in draft.monarchs.iter().enumerate() {
        check_monarch(index + 1, monarch, &mut warnings);
    }

    warnings
}

fn check_president(position: usize, president: &PresidentForm, warnings: &mut Vec<SemanticWarning>) {
    let birth = parse_date(&president.birth);
    let death = president.death.as_deref().and_then(parse_date);

    if let (Some(birth), Some(death)) = (birth, death) {
        if death < birth {
            warnings.push(SemanticWarning::DeathBeforeBirth {
                role: Role::President,
                position,
                name: president.name.clone(),
                birth,
                death,
            });
        }
    }

    for (index, event) in president.events.iter().enumerate() {
        let Some(date) = parse_instant(&event.date).map(|instant| instant.date_naive()) else {
            continue;
        };
        if let Some(birth) = birth.filter(|birth| date < *birth) {
            warnings.push(SemanticWarning::EventBeforeBirth {
                position,
                name: president.name.clone(),
                event_position: index + 1,
                date,
                birth,
            });
        }
        // Posthumous events are always flagged, even deliberate ones.
        if let Some(death) = death.filter(|death| date > *death) {
            warnings.push(SemanticWarning::EventAfterDeath {
                position,
                name: president.name.clone(),
                event_position: index + 1,
                date,
                death,
            });
        }
    }
}

struct Term<'a> {
    name: &'a str,
    begins: DateTime<Utc>,
    ends: DateTime<Utc>,
}

/// Compare each president's first recorded term against the next one to
/// start. Presidents lacking either a begin or an end event are left out.
fn check_term_overlaps(presidents: &[PresidentForm], warnings: &mut Vec<SemanticWarning>) {
    let first_of = |president: &PresidentForm, kind: EventType| {
        president
            .events
            .iter()
            .find(|event| event.kind == Some(kind))
            .and_then(|event| parse_instant(&event.date))
    };

    let mut terms: Vec<Term<'_>> = presidents
        .iter()
        .filter_map(|president| {
            Some(Term {
                name: &president.name,
                begins: first_of(president, EventType::TermBegins)?,
                ends: first_of(president, EventType::TermEnds)?,
            })
        })
        .collect();
    terms.sort_by_key(|term| term.begins);

    for pair in terms.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if before.ends > after.begins {
            warnings.push(SemanticWarning::TermOverlap {
                predecessor: before.name.to_string(),
                successor: after.name.to_string(),
                predecessor_end: before.ends.date_naive(),
                successor_start: after.begins.date_naive(),
            });
        }
    }
}

fn check_monarch(position: usize, monarch: &MonarchForm, warnings: &mut Vec<SemanticWarning>) {
    let birth = parse_date(&monarch.birth);
    let death = monarch.death.as_deref().and_then(parse_date);
    let start = parse_date(&monarch.start_reign);
    let end = monarch.end_reign.as_deref().and_then(parse_date);

    if let (Some(birth), Some(death)) = (birth, death) {
        if death < birth {
            warnings.push(SemanticWarning::DeathBeforeBirth {
                role: Role::Monarch,
                position,
                name: monarch.name.clone(),
                birth,
                death,
            });
        }
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            warnings.push(SemanticWarning::ReignEndsBeforeStart {
                position,
                name: monarch.name.clone(),
                start,
                end,
            });
        }
    }
    if let (Some(birth), Some(start)) = (birth, start) {
        if start < birth {
            warnings.push(SemanticWarning::ReignBeforeBirth {
                position,
                name: monarch.name.clone(),
                birth,
                start,
            });
        }
    }
}
