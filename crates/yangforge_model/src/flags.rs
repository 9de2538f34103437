//! Packed per-statement flags.
//!
//! Status, config, mandatory, user-ordered, and presence are folded into one
//! small word on every effective statement, so that the common accessors
//! never chase substatements.

use crate::arg::{OrderedBy, Status};

const STATUS_MASK: u16 = 0b11;
const STATUS_DEPRECATED: u16 = 0b01;
const STATUS_OBSOLETE: u16 = 0b10;
const CONFIG: u16 = 1 << 2;
const MANDATORY: u16 = 1 << 3;
const USER_ORDERED: u16 = 1 << 4;
const PRESENCE: u16 = 1 << 5;

/// Packed status/config/mandatory/user-ordered/presence word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatementFlags(u16);

impl StatementFlags {
    /// Returns the statement's status.
    #[must_use]
    pub const fn status(self) -> Status {
        match self.0 & STATUS_MASK {
            STATUS_DEPRECATED => Status::Deprecated,
            STATUS_OBSOLETE => Status::Obsolete,
            _ => Status::Current,
        }
    }

    /// Returns true if the statement represents configuration data.
    #[must_use]
    pub const fn is_config(self) -> bool {
        self.0 & CONFIG != 0
    }

    /// Returns true if the statement is mandatory.
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        self.0 & MANDATORY != 0
    }

    /// Returns true if list/leaf-list ordering is user-controlled.
    #[must_use]
    pub const fn is_user_ordered(self) -> bool {
        self.0 & USER_ORDERED != 0
    }

    /// Returns true for presence containers.
    #[must_use]
    pub const fn is_presence(self) -> bool {
        self.0 & PRESENCE != 0
    }
}

impl Default for StatementFlags {
    fn default() -> Self {
        FlagsBuilder::new().build()
    }
}

/// Builder assembling a [`StatementFlags`] word.
///
/// Defaults mirror RFC 7950: status current, config true, not mandatory,
/// system-ordered, non-presence.
#[derive(Clone, Debug)]
pub struct FlagsBuilder {
    status: Status,
    config: bool,
    mandatory: bool,
    ordered_by: OrderedBy,
    presence: bool,
}

impl FlagsBuilder {
    /// Creates a builder with RFC defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Status::Current,
            config: true,
            mandatory: false,
            ordered_by: OrderedBy::System,
            presence: false,
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the config flag.
    #[must_use]
    pub fn config(mut self, config: bool) -> Self {
        self.config = config;
        self
    }

    /// Sets the mandatory flag.
    #[must_use]
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Sets the ordering mode.
    #[must_use]
    pub fn ordered_by(mut self, ordered_by: OrderedBy) -> Self {
        self.ordered_by = ordered_by;
        self
    }

    /// Sets the presence flag.
    #[must_use]
    pub fn presence(mut self, presence: bool) -> Self {
        self.presence = presence;
        self
    }

    /// Packs the flags word.
    #[must_use]
    pub fn build(self) -> StatementFlags {
        let mut word = match self.status {
            Status::Current => 0,
            Status::Deprecated => STATUS_DEPRECATED,
            Status::Obsolete => STATUS_OBSOLETE,
        };
        if self.config {
            word |= CONFIG;
        }
        if self.mandatory {
            word |= MANDATORY;
        }
        if matches!(self.ordered_by, OrderedBy::User) {
            word |= USER_ORDERED;
        }
        if self.presence {
            word |= PRESENCE;
        }
        StatementFlags(word)
    }
}

impl Default for FlagsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
