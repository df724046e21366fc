/// How many more times an ability may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uses {
    Unlimited,
    Limited(u32),
}

/// Which of the actor's chosen targets an ability reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targeting {
    /// Fires without a target (drunk, insomniac).
    None,
    /// Reads `Player::target`.
    Single,
    /// Reads `Player::target` and `Player::second_target`.
    Pair,
}

/// Checks evaluated against the actor, the resolved target(s) and the night
/// state. An ability fires only if every one of its conditions holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    TargetAlive,
    TargetIsSelf,
    TargetNotSelf,
    TargetNotHealed,
    TargetNotNightImmune,
    /// Both targets of a pair ability differ from each other.
    TargetsDistinct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Heal,
    Roleblock,
    Kill,
    /// Reports whether the target is hostile, respecting detection immunity.
    Investigate,
    /// Tells the actor the target's current role.
    RevealRole,
    /// Exchanges roles with the target and tells the actor what they took.
    Rob,
    /// Exchanges the roles of the two targets.
    SwapTargets,
    /// Exchanges the actor's role with a random center card, unseen.
    SwapWithCenter,
    /// Becomes a copy of the target's role and keeps acting as it.
    Copy,
    /// Tells the actor their own current role.
    RevealOwnRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    pub name: &'static str,
    pub targeting: Targeting,
    pub conditions: &'static [Condition],
    pub action: Action,
    pub uses: Uses,
}

impl Ability {
    pub const fn new(
        name: &'static str,
        targeting: Targeting,
        conditions: &'static [Condition],
        action: Action,
    ) -> Self {
        Ability {
            name,
            targeting,
            conditions,
            action,
            uses: Uses::Unlimited,
        }
    }

    pub const fn limited(mut self, uses: u32) -> Self {
        self.uses = Uses::Limited(uses);
        self
    }

    pub fn has_uses(&self) -> bool {
        !matches!(self.uses, Uses::Limited(0))
    }

    pub fn consume(&mut self) {
        if let Uses::Limited(left) = &mut self.uses {
            *left = left.saturating_sub(1);
        }
    }

    pub fn uses_left(&self) -> Option<u32> {
        match self.uses {
            Uses::Unlimited => None,
            Uses::Limited(left) => Some(left),
        }
    }
}
