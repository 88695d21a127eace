//! Per-combatant runtime state and derived statistics.
//!
//! A [`UnitState`] owns its bonus storage and its mutable bookkeeping (health,
//! usage counters, turn flags, markers). Identity and battlefield facts are
//! borrowed from providers that outlive the battle. Every combat number is
//! derived on demand from the current bonus snapshot; a revision-keyed cache
//! avoids folding the same selection twice between mutations.

use crate::bonus::{
    Bonus, BonusBearer, BonusDuration, BonusList, BonusNode, BonusSubtype, BonusType, LimiterContext,
    PrimarySkill, RangedTotals, Selector, StatBounds, ValueCache,
};
use crate::config::BattleConfig;

use super::counters::{TurnFlags, UnitMarkers, UsageCounter};
use super::environment::UnitEnvironment;
use super::health::{HealLevel, HealPower, UnitHealth};
use super::info::{BattleHex, UnitId, UnitInfo};

/// Mutable combat state of one unit.
///
/// `B` is the bonus storage; [`BonusNode`] unless a caller supplies its own
/// bearer (e.g. a proxy over a shared hero node).
#[derive(Clone)]
pub struct UnitState<'a, B: BonusBearer = BonusNode> {
    info: &'a dyn UnitInfo,
    env: Option<&'a dyn UnitEnvironment>,
    bonuses: B,
    cache: ValueCache,
    health: UnitHealth,
    shots: UsageCounter,
    casts: UsageCounter,
    retaliations: UsageCounter,
    flags: TurnFlags,
    markers: UnitMarkers,
    position: BattleHex,
    clone_id: Option<UnitId>,
}

impl<'a, B: BonusBearer> UnitState<'a, B> {
    /// Creates a detached state: full health, no environment, off the field.
    pub fn new(info: &'a dyn UnitInfo, bonuses: B) -> Self {
        let mut state = Self {
            info,
            env: None,
            bonuses,
            cache: ValueCache::new(),
            health: UnitHealth::default(),
            shots: UsageCounter::new(),
            casts: UsageCounter::new(),
            retaliations: UsageCounter::new(),
            flags: TurnFlags::empty(),
            markers: UnitMarkers::empty(),
            position: BattleHex::INVALID,
            clone_id: None,
        };
        state.reset_state();
        state
    }

    /// Attaches the battlefield environment and resets to a fresh stack.
    pub fn local_init(&mut self, env: &'a dyn UnitEnvironment) {
        self.env = Some(env);
        self.reset_state();
    }

    /// Full health, unused counters, cleared flags and markers.
    pub fn reset_state(&mut self) {
        self.health = UnitHealth::new(self.max_health(), self.info.unit_base_amount());
        self.shots.reset();
        self.casts.reset();
        self.retaliations.reset();
        self.flags = TurnFlags::empty();
        self.markers = UnitMarkers::empty();
        self.clone_id = None;
        self.cache.clear();
    }

    pub fn info(&self) -> &'a dyn UnitInfo {
        self.info
    }

    pub fn unit_id(&self) -> UnitId {
        self.info.unit_id()
    }

    pub fn bearer(&self) -> &B {
        &self.bonuses
    }

    // ===== bonus access =====

    /// Selects bonuses that match `selector` and whose limiter accepts this
    /// unit.
    pub fn bonuses(&self, selector: &Selector) -> BonusList {
        let mut selected = self.bonuses.select(selector);
        if selected.iter().any(|b| b.limiter.is_some()) {
            let all = self.bonuses.select(&Selector::all());
            let ctx = LimiterContext {
                creature: self.info.creature_id(),
                side: self.info.unit_side(),
                bonuses: &all,
            };
            selected.retain(|b| b.limiter.as_ref().is_none_or(|l| l.accepts(&ctx)));
        }
        selected
    }

    pub fn has_bonus(&self, selector: &Selector) -> bool {
        !self.bonuses(selector).is_empty()
    }

    pub fn value_of(&self, selector: &Selector) -> i32 {
        self.bonuses(selector).total_value()
    }

    pub fn has_bonus_of_type(&self, kind: BonusType) -> bool {
        self.has_bonus(&Selector::kind(kind))
    }

    pub fn value_of_type(&self, kind: BonusType) -> i32 {
        self.value_of(&Selector::kind(kind))
    }

    pub fn add_bonus(&mut self, bonus: Bonus) {
        self.bonuses.add_new_bonus(bonus);
    }

    pub fn remove_bonus(&mut self, bonus: &Bonus) -> bool {
        self.bonuses.remove_bonus(bonus)
    }

    pub fn update_bonus(&mut self, bonus: Bonus) -> bool {
        self.bonuses.update_bonus(bonus)
    }

    pub fn remove_bonuses(&mut self, selector: &Selector) -> BonusList {
        self.bonuses.remove_bonuses(selector)
    }

    /// Drops every bonus whose lifetime includes any of `duration`.
    pub fn expire_bonuses(&mut self, duration: BonusDuration) -> BonusList {
        self.bonuses.remove_bonuses(&Selector::duration(duration))
    }

    pub fn tick_turns(&mut self) -> BonusList {
        self.bonuses.tick_turns()
    }

    fn cached(&self, key: (&'static str, u32), compute: impl FnOnce() -> i32) -> i32 {
        self.cache.get_or_compute(key, self.bonuses.revision(), compute)
    }

    // ===== primary skills =====

    fn skill_sum(&self, skill: PrimarySkill, ranged: bool) -> i32 {
        self.value_of(
            &Selector::type_subtype(BonusType::PrimarySkill, BonusSubtype::PrimarySkill(skill))
                .and(Selector::effect_range(ranged)),
        )
    }

    /// Effective attack in melee (`false`) or ranged (`true`) combat.
    ///
    /// Frenzy converts defence into attack at its combined percentage. The
    /// conversion runs once, after the linear sum.
    pub fn attack(&self, ranged: bool) -> i32 {
        self.cached(("attack", u32::from(ranged)), || {
            let mut value = i64::from(self.skill_sum(PrimarySkill::Attack, ranged));
            let frenzy = self.bonuses(&Selector::kind(BonusType::InFrenzy));
            if !frenzy.is_empty() {
                let power = i64::from(frenzy.total_value());
                let defence = i64::from(self.skill_sum(PrimarySkill::Defense, ranged));
                value += (power * defence).div_euclid(100);
            }
            value.clamp(0, i64::from(i32::MAX)) as i32
        })
    }

    /// Effective defence; zero while in frenzy.
    pub fn defence(&self, ranged: bool) -> i32 {
        self.cached(("defence", u32::from(ranged)), || {
            if self.has_bonus_of_type(BonusType::InFrenzy) {
                0
            } else {
                StatBounds::NON_NEGATIVE.clamp(self.skill_sum(PrimarySkill::Defense, ranged))
            }
        })
    }

    pub fn initiative(&self) -> i32 {
        self.initiative_at(0)
    }

    /// Initiative `turn` rounds from now, counting only bonuses still active then.
    ///
    /// Only the current round is cached; lookahead is computed fresh.
    pub fn initiative_at(&self, turn: u32) -> i32 {
        let compute = || {
            StatBounds::NON_NEGATIVE.clamp(
                self.value_of(&Selector::kind(BonusType::StacksSpeed).and(Selector::turns(turn))),
            )
        };
        if turn == 0 {
            self.cached(("initiative", 0), compute)
        } else {
            compute()
        }
    }

    /// Hit points of one creature at full health; at least 1.
    pub fn max_health(&self) -> i32 {
        self.cached(("max_health", 0), || {
            StatBounds::UNIT_HEALTH.clamp(self.value_of_type(BonusType::StackHealth))
        })
    }

    /// Melee and ranged attacks per turn.
    pub fn total_attacks(&self) -> RangedTotals {
        let extra = |ranged| {
            self.value_of(
                &Selector::kind(BonusType::AdditionalAttack).and(Selector::effect_range(ranged)),
            )
        };
        RangedTotals::new(
            BattleConfig::BASE_ATTACKS + extra(false),
            BattleConfig::BASE_ATTACKS + extra(true),
        )
    }

    // ===== health =====

    pub fn count(&self) -> i32 {
        self.health.count()
    }

    pub fn first_hp_left(&self) -> i32 {
        self.health.first_hp_left()
    }

    /// Creatures lost so far, net of one-battle resurrections.
    pub fn killed(&self) -> i32 {
        (self.info.unit_base_amount() - self.health.count() + self.health.resurrected()).max(0)
    }

    pub fn available_health(&self) -> i64 {
        self.health.available(self.max_health())
    }

    /// Health pool the stack can be restored up to.
    pub fn total_health(&self) -> i64 {
        UnitHealth::total(self.max_health(), self.info.unit_base_amount())
    }

    pub fn health(&self) -> &UnitHealth {
        &self.health
    }

    /// Applies damage and returns the health actually lost.
    ///
    /// Clones have no real hit points: any positive damage destroys them.
    pub fn damage(&mut self, amount: i64) -> i64 {
        if self.is_clone() {
            if amount <= 0 {
                return 0;
            }
            let lost = self.available_health();
            self.health.reset();
            return lost;
        }
        let max_health = self.max_health();
        self.health.damage(amount, max_health)
    }

    /// Restores health and returns the amount applied. Clones cannot be healed.
    pub fn heal(&mut self, amount: i64, level: HealLevel, power: HealPower) -> i64 {
        if self.is_clone() {
            return 0;
        }
        let max_health = self.max_health();
        self.health
            .heal(amount, level, power, max_health, self.info.unit_base_amount())
    }

    /// Removes creatures that were raised for this battle only.
    pub fn take_resurrected(&mut self) {
        let max_health = self.max_health();
        self.health.take_resurrected(max_health);
    }

    // ===== life cycle =====

    pub fn alive(&self) -> bool {
        self.health.count() > 0
    }

    pub fn is_ghost(&self) -> bool {
        self.markers.contains(UnitMarkers::GHOST)
    }

    pub fn is_ghost_pending(&self) -> bool {
        self.markers.contains(UnitMarkers::GHOST_PENDING)
    }

    pub fn is_dead(&self) -> bool {
        !self.alive() && !self.is_ghost()
    }

    pub fn is_turret(&self) -> bool {
        self.info.is_turret()
    }

    pub fn is_clone(&self) -> bool {
        self.markers.contains(UnitMarkers::CLONED)
    }

    pub fn has_clone(&self) -> bool {
        self.markers.contains(UnitMarkers::HAS_CLONE)
    }

    pub fn clone_id(&self) -> Option<UnitId> {
        self.clone_id
    }

    pub fn is_summoned(&self) -> bool {
        self.markers.contains(UnitMarkers::SUMMONED)
    }

    pub fn markers(&self) -> UnitMarkers {
        self.markers
    }

    pub fn set_markers(&mut self, markers: UnitMarkers) {
        self.markers = markers;
    }

    /// Marks this unit as a clone.
    pub fn mark_clone(&mut self) {
        self.markers.insert(UnitMarkers::CLONED | UnitMarkers::SUMMONED);
    }

    /// Links this unit to its clone.
    pub fn set_clone(&mut self, clone: Option<UnitId>) {
        self.clone_id = clone;
        self.markers.set(UnitMarkers::HAS_CLONE, clone.is_some());
    }

    /// Targetable by effects: alive (or dead when `allow_dead`), on the
    /// field, and not a turret.
    pub fn is_valid_target(&self, allow_dead: bool) -> bool {
        (self.alive() || (allow_dead && self.is_dead()))
            && self.position.is_valid()
            && !self.is_turret()
    }

    /// Kills the stack and schedules removal from the field.
    pub fn make_ghost(&mut self) {
        self.health.reset();
        self.markers.insert(UnitMarkers::GHOST_PENDING);
    }

    /// Completes removal: the unit stays in the arena only for bookkeeping.
    pub fn on_removed(&mut self) {
        self.health.reset();
        self.markers.remove(UnitMarkers::GHOST_PENDING);
        self.markers.insert(UnitMarkers::GHOST);
    }

    pub fn position(&self) -> BattleHex {
        self.position
    }

    pub fn set_position(&mut self, position: BattleHex) {
        self.position = position;
    }

    // ===== capabilities =====

    pub fn is_shooter(&self) -> bool {
        self.has_bonus_of_type(BonusType::Shooter)
    }

    pub fn total_shots(&self) -> i32 {
        self.value_of_type(BonusType::Shots)
    }

    /// Shots are unlimited only for shooters backed by an ammunition cart.
    pub fn shots_limited(&self) -> bool {
        !(self.is_shooter() && self.env.is_some_and(|env| env.unit_has_ammo_cart(self.info)))
    }

    pub fn shots_left(&self) -> i32 {
        self.shots.available(self.total_shots())
    }

    /// Shooter with ammunition left (or a cart) and not locked into melee.
    pub fn can_shoot(&self) -> bool {
        self.is_shooter()
            && (!self.shots_limited() || self.shots.can_use(self.total_shots(), 1))
            && !self.env.is_some_and(|env| env.battle_is_unit_blocked(self.info))
    }

    pub fn is_caster(&self) -> bool {
        self.has_bonus_of_type(BonusType::SpellCaster)
    }

    pub fn total_casts(&self) -> i32 {
        self.value_of_type(BonusType::Casts)
    }

    pub fn can_cast(&self) -> bool {
        self.is_caster() && self.casts.can_use(self.total_casts(), 1)
    }

    pub fn casts_left(&self) -> i32 {
        self.casts.available(self.total_casts())
    }

    /// Retaliations allowed per round; `None` means unlimited.
    pub fn total_retaliations(&self) -> Option<i32> {
        if self.has_bonus_of_type(BonusType::NoRetaliation)
            || self.has_bonus_of_type(BonusType::SiegeWeapon)
        {
            return Some(0);
        }
        if self.has_bonus_of_type(BonusType::UnlimitedRetaliations) {
            return None;
        }
        Some(BattleConfig::BASE_RETALIATIONS + self.value_of_type(BonusType::AdditionalRetaliation))
    }

    pub fn able_to_retaliate(&self) -> bool {
        self.alive()
            && match self.total_retaliations() {
                Some(total) => self.retaliations.can_use(total, 1),
                None => true,
            }
    }

    // ===== turn flags =====

    pub fn flags(&self) -> TurnFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TurnFlags) {
        self.flags = flags;
    }

    pub fn moved(&self) -> bool {
        self.moved_at(0)
    }

    /// Flags only describe the current round; every later turn reads false.
    pub fn moved_at(&self, turn: u32) -> bool {
        turn == 0 && self.flags.contains(TurnFlags::MOVED)
    }

    pub fn waited(&self) -> bool {
        self.waited_at(0)
    }

    pub fn waited_at(&self, turn: u32) -> bool {
        turn == 0 && self.flags.contains(TurnFlags::WAITED)
    }

    pub fn defended(&self) -> bool {
        self.defended_at(0)
    }

    pub fn defended_at(&self, turn: u32) -> bool {
        turn == 0 && self.flags.contains(TurnFlags::DEFENDING)
    }

    pub fn can_move(&self) -> bool {
        self.can_move_at(0)
    }

    pub fn can_move_at(&self, turn: u32) -> bool {
        self.alive()
            && !self.has_bonus(&Selector::kind(BonusType::NotActive).and(Selector::turns(turn)))
    }

    pub fn will_move(&self) -> bool {
        self.will_move_at(0)
    }

    pub fn will_move_at(&self, turn: u32) -> bool {
        self.can_move_at(turn) && !self.defended_at(turn) && !self.moved_at(turn)
    }

    // ===== actions =====

    /// Records an attack. Retaliations consume the per-round allowance;
    /// shots are spent only when they are limited.
    pub fn after_attack(&mut self, shooting: bool, retaliation: bool) {
        if retaliation && let Some(total) = self.total_retaliations() {
            self.retaliations.spend(total, 1);
        }
        if shooting && self.shots_limited() {
            let total = self.total_shots();
            self.shots.spend(total, 1);
        }
    }

    pub fn after_cast(&mut self) {
        let total = self.total_casts();
        self.casts.spend(total, 1);
    }

    pub fn make_move(&mut self) {
        self.flags.insert(TurnFlags::MOVED);
    }

    /// Defending ends the unit's turn.
    pub fn defend(&mut self) {
        self.flags.insert(TurnFlags::DEFENDING | TurnFlags::MOVED);
    }

    pub fn wait(&mut self) {
        self.flags.insert(TurnFlags::WAITED);
    }

    /// Expires bonuses that last until the unit's next turn.
    pub fn after_gets_turn(&mut self) -> BonusList {
        self.expire_bonuses(BonusDuration::UNIT_GETS_TURN)
    }

    /// Clears per-round flags and retaliations. A clone whose lifetime
    /// marker has lapsed dies here.
    pub fn after_new_round(&mut self) {
        self.flags = TurnFlags::empty();
        self.retaliations.reset();
        if self.alive() && self.is_clone() && !self.has_bonus_of_type(BonusType::LifetimeMarker) {
            self.make_ghost();
        }
    }
}

impl<B: BonusBearer> core::fmt::Debug for UnitState<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnitState")
            .field("id", &self.info.unit_id())
            .field("health", &self.health)
            .field("flags", &self.flags)
            .field("markers", &self.markers)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
