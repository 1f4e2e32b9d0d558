//! Module: db::bootstrap
//! Responsibility: startup count, the decision to seed, and the status line.
//! Does not own: the seeding loop itself (seed) or the first query (session).

use crate::{
    config::SeedConfig,
    db::store::StoreHandle,
    error::InternalError,
    seed::{SeedHandle, SeedProgress, Seeder},
};
use std::fmt;

///
/// StatusLine
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatusLine {
    Seeding { current: u64, total: u64 },
    Progress { added: u64, total: u64 },
    FullySeeded,
    FullyLoaded,
    SeedFailed { message: String },
}

impl StatusLine {
    /// Whether seeding is still running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Seeding { .. } | Self::Progress { .. })
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seeding { current, total } => {
                write!(f, "Seeding {} / {}...", grouped(*current), grouped(*total))
            }
            Self::Progress { added, total } => {
                write!(f, "{} / {} customers added...", grouped(*added), grouped(*total))
            }
            Self::FullySeeded => f.write_str("Database fully seeded"),
            Self::FullyLoaded => f.write_str("Database fully loaded"),
            Self::SeedFailed { message } => write!(f, "Seeding failed: {message}"),
        }
    }
}

///
/// StatusTracker
///
/// Folds seeding progress into the line shown above the table.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusTracker {
    total: u64,
    line: StatusLine,
}

impl StatusTracker {
    #[must_use]
    pub const fn new(count: u64, total: u64) -> Self {
        let line = if count < total {
            StatusLine::Seeding {
                current: count,
                total,
            }
        } else {
            StatusLine::FullyLoaded
        };

        Self { total, line }
    }

    pub fn observe(&mut self, progress: &SeedProgress) {
        self.line = match progress {
            SeedProgress::Added { added } => StatusLine::Progress {
                added: *added,
                total: self.total,
            },
            SeedProgress::Done => StatusLine::FullySeeded,
            SeedProgress::Failed { message } => StatusLine::SeedFailed {
                message: message.clone(),
            },
        };
    }

    #[must_use]
    pub const fn line(&self) -> &StatusLine {
        &self.line
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.line.is_loading()
    }

    /// Text for the status bar given how many rows the table currently holds.
    #[must_use]
    pub fn render(&self, displayed: usize) -> String {
        match &self.line {
            StatusLine::Seeding { .. } | StatusLine::Progress { .. } | StatusLine::SeedFailed { .. } => {
                self.line.to_string()
            }
            StatusLine::FullySeeded | StatusLine::FullyLoaded => format!(
                "Displaying {} of ~{} customers",
                grouped(displayed as u64),
                grouped(self.total)
            ),
        }
    }
}

///
/// Startup
///

pub struct Startup {
    pub count: u64,
    pub status: StatusTracker,
    pub seeding: Option<SeedHandle>,
}

/// Count the store and start seeding when it is short of the target.
pub async fn startup(store: &StoreHandle, config: &SeedConfig) -> Result<Startup, InternalError> {
    let count = store.count().await?;
    let status = StatusTracker::new(count, config.total_target);

    let seeding = (count < config.total_target).then(|| {
        tracing::info!(count, target = config.total_target, "store below target, seeding");
        Seeder::from_config(config).start(store.clone(), count, config.total_target)
    });

    Ok(Startup {
        count,
        status,
        seeding,
    })
}

// 1234567 -> "1,234,567"
fn grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
