//! Hunt sessions and loot resolution.
//!
//! A session counts down from [`HUNT_DURATION_SECS`] under external ticks. The
//! countdown is presentation only: resolution looks at nothing but
//! `remaining_seconds == 0` and the `resolved` flag, so a session yields at
//! most one non-zero award however many times it is resolved.

use soroban_sdk::Env;

use crate::store::PlayerRecordStore;
use crate::{
    HuntSession, Inventory, InventoryDelta, LootAward, LootTable, Material, PendingAward,
    VarsynError,
};

/// Countdown length of a fresh hunt.
pub const HUNT_DURATION_SECS: u32 = 5;

/// Samples are drawn from `[0, LOOT_SCALE)`; thresholds are basis points.
pub const LOOT_SCALE: u32 = 10_000;

/// Standard table: 5% currency, 15% hide, 30% bone, 50% meat, six draws.
pub const CURRENCY_BPS: u32 = 500;
pub const HIDE_BPS: u32 = 2_000;
pub const BONE_BPS: u32 = 5_000;
pub const DRAWS_PER_HUNT: u32 = 6;

pub const MAX_DRAWS: u32 = 32;

/// Source of loot samples in `[0, LOOT_SCALE)`.
pub trait LootRoll {
    fn roll(&mut self) -> u32;
}

/// Samples from the host PRNG.
pub struct PrngRolls<'a> {
    env: &'a Env,
}

impl<'a> PrngRolls<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }
}

impl LootRoll for PrngRolls<'_> {
    fn roll(&mut self) -> u32 {
        self.env
            .prng()
            .gen_range::<u64>(0..=((LOOT_SCALE - 1) as u64)) as u32
    }
}

impl LootTable {
    pub fn standard() -> Self {
        Self {
            currency_bps: CURRENCY_BPS,
            hide_bps: HIDE_BPS,
            bone_bps: BONE_BPS,
            draws: DRAWS_PER_HUNT,
        }
    }

    /// Thresholds must be cumulative and within scale.
    pub fn is_valid(&self) -> bool {
        self.currency_bps <= self.hide_bps
            && self.hide_bps <= self.bone_bps
            && self.bone_bps <= LOOT_SCALE
            && self.draws >= 1
            && self.draws <= MAX_DRAWS
    }

    /// Rarest first: currency, hide, bone, then meat for the remainder.
    pub fn classify(&self, sample: u32) -> Material {
        if sample < self.currency_bps {
            Material::Currency
        } else if sample < self.hide_bps {
            Material::Hide
        } else if sample < self.bone_bps {
            Material::Bone
        } else {
            Material::Meat
        }
    }
}

impl LootAward {
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> u32 {
        self.meat + self.bone + self.hide + self.currency
    }

    fn credit(&mut self, material: Material) {
        match material {
            Material::Meat => self.meat += 1,
            Material::Bone => self.bone += 1,
            Material::Hide => self.hide += 1,
            Material::Currency => self.currency += 1,
        }
    }
}

impl PendingAward {
    pub fn is_pending(&self) -> bool {
        matches!(self, PendingAward::Award(_))
    }

    pub fn award(&self) -> Option<LootAward> {
        match self {
            PendingAward::None => None,
            PendingAward::Award(award) => Some(award.clone()),
        }
    }
}

impl From<&LootAward> for InventoryDelta {
    fn from(award: &LootAward) -> Self {
        Self {
            meat: award.meat,
            bone: award.bone,
            hide: award.hide,
            currency: award.currency,
        }
    }
}

impl InventoryDelta {
    /// Delta touching a single counter.
    pub fn single(material: Material, quantity: u32) -> Self {
        let mut delta = Self::default();
        match material {
            Material::Meat => delta.meat = quantity,
            Material::Bone => delta.bone = quantity,
            Material::Hide => delta.hide = quantity,
            Material::Currency => delta.currency = quantity,
        }
        delta
    }
}

impl Inventory {
    pub fn count(&self, material: Material) -> u32 {
        match material {
            Material::Meat => self.meat,
            Material::Bone => self.bone,
            Material::Hide => self.hide,
            Material::Currency => self.currency,
        }
    }

    fn credit(&mut self, award: &LootAward) {
        self.meat = self.meat.saturating_add(award.meat);
        self.bone = self.bone.saturating_add(award.bone);
        self.hide = self.hide.saturating_add(award.hide);
        self.currency = self.currency.saturating_add(award.currency);
    }
}

pub fn start() -> HuntSession {
    HuntSession {
        remaining_seconds: HUNT_DURATION_SECS,
        resolved: false,
        pending_award: PendingAward::None,
    }
}

/// One second of countdown. Never goes below zero.
pub fn tick(session: &HuntSession) -> HuntSession {
    let mut next = session.clone();
    next.remaining_seconds = next.remaining_seconds.saturating_sub(1);
    next
}

/// Roll the loot for a finished, unresolved session and return the award
/// together with the credited inventory. Any other session gets a zero award
/// and the inventory back unchanged.
pub fn resolve<R: LootRoll>(
    session: &mut HuntSession,
    inventory: &Inventory,
    table: &LootTable,
    rolls: &mut R,
) -> (LootAward, Inventory) {
    if session.remaining_seconds != 0 || session.resolved {
        return (LootAward::default(), inventory.clone());
    }

    let mut award = LootAward::default();
    for _ in 0..table.draws {
        award.credit(table.classify(rolls.roll()));
    }

    let mut credited = inventory.clone();
    credited.credit(&award);
    session.resolved = true;
    (award, credited)
}

/// Resolve and write the award through the store.
///
/// `inventory` is updated in place before the write and is not rolled back if
/// the write fails; the award is then parked in `session.pending_award` and
/// `StoreUnavailable` is returned.
pub fn settle<R, S>(
    session: &mut HuntSession,
    inventory: &mut Inventory,
    table: &LootTable,
    rolls: &mut R,
    store: &S,
) -> Result<LootAward, VarsynError>
where
    R: LootRoll,
    S: PlayerRecordStore,
{
    let (award, credited) = resolve(session, inventory, table, rolls);
    if award.is_zero() {
        return Ok(award);
    }

    *inventory = credited;
    match store.update_inventory(inventory.player_id, &InventoryDelta::from(&award)) {
        Ok(stored) => {
            *inventory = stored;
            Ok(award)
        }
        Err(err) => {
            session.pending_award = PendingAward::Award(award);
            Err(err)
        }
    }
}

/// Retry the write of a pending award. `Ok(None)` when nothing was pending.
pub fn sync_pending<S: PlayerRecordStore>(
    session: &mut HuntSession,
    store: &S,
    player_id: u32,
) -> Result<Option<Inventory>, VarsynError> {
    let Some(award) = session.pending_award.award() else {
        return Ok(None);
    };

    let stored = store.update_inventory(player_id, &InventoryDelta::from(&award))?;
    session.pending_award = PendingAward::None;
    Ok(Some(stored))
}
