use crate::{
    model::Record,
    types::{RecordId, Timestamp},
};
use xxhash_rust::xxh3::xxh3_64_with_seed;

const FIRST_NAMES: [&str; 6] = ["Aarav", "Meera", "Kiran", "Ravi", "Priya", "Rahul"];
const LAST_NAMES: [&str; 6] = ["Patel", "Sharma", "Reddy", "Iyer", "Kumar", "Singh"];

const PHONE_BASE: u64 = 6_000_000_000;
const PHONE_SPAN: u64 = 4_000_000_000;
const ACTIVITY_WINDOW_DAYS: u64 = 30;

///
/// Draw
///
/// Independent value streams per record; each field hashes its own tag so
/// changing one field's derivation never shifts another.
///

#[derive(Clone, Copy)]
#[repr(u8)]
enum Draw {
    FirstName = 1,
    LastName = 2,
    Phone = 3,
    Score = 4,
    Activity = 5,
}

///
/// RecordGenerator
///
/// Deterministic synthetic customers: the same `(seed, now, offset)` always
/// yields the same record.
///

#[derive(Clone, Copy, Debug)]
pub struct RecordGenerator {
    seed: u64,
    now: Timestamp,
}

impl RecordGenerator {
    #[must_use]
    pub const fn new(seed: u64, now: Timestamp) -> Self {
        Self { seed, now }
    }

    /// Record for store offset `offset` (0-based); its id is `offset + 1`.
    #[must_use]
    pub fn record_at(&self, offset: u64) -> Record {
        let id = RecordId::from_offset(offset);
        let first = pick(&FIRST_NAMES, self.draw(id, Draw::FirstName));
        let last = pick(&LAST_NAMES, self.draw(id, Draw::LastName));
        let score = u8::try_from(self.draw(id, Draw::Score) % 100).unwrap_or_default();
        let age = self.draw(id, Draw::Activity) % (ACTIVITY_WINDOW_DAYS * Timestamp::MILLIS_PER_DAY);

        Record {
            id,
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{id}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            phone: format!("+91{}", PHONE_BASE + self.draw(id, Draw::Phone) % PHONE_SPAN),
            score,
            last_activity_at: self.now.saturating_sub_millis(age),
            added_by: "System".to_string(),
            avatar: format!("https://api.dicebear.com/7.x/initials/svg?seed={first}+{last}"),
        }
    }

    /// Records for offsets `from..from + count`.
    #[must_use]
    pub fn batch(&self, from: u64, count: u64) -> Vec<Record> {
        (from..from.saturating_add(count))
            .map(|offset| self.record_at(offset))
            .collect()
    }

    fn draw(&self, id: RecordId, draw: Draw) -> u64 {
        let mut buf = [0_u8; 9];
        buf[..8].copy_from_slice(&id.get().to_le_bytes());
        buf[8] = draw as u8;

        xxh3_64_with_seed(&buf, self.seed)
    }
}

fn pick(options: &[&'static str], draw: u64) -> &'static str {
    let len = options.len() as u64;
    let slot = usize::try_from(draw % len).unwrap_or_default();

    options[slot]
}
