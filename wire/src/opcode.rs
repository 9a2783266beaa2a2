//! Opcodes, connection routing tags and the opcode dispatch table.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::envelope::InboundFrame;
use crate::error::DecodeError;
use crate::limits::Limits;
use crate::message::{decode_message, Decodable};

/// A numeric message tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Opcode(u32);

impl Opcode {
    /// Wraps a raw opcode.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Opcode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Logical channel a message travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionType {
    /// Realm (world) connection.
    Realm,
    /// Instance connection.
    Instance,
    /// Whichever connection the session currently routes to.
    #[default]
    Default,
}

/// Session state an inbound handler requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Authenticated, no character in world yet.
    Authed,
    /// Character in world.
    LoggedIn,
    /// Character moving between maps.
    Transfer,
    /// Character in world, or logged out moments ago.
    LoggedInOrRecentlyLoggedOut,
    /// Never accepted from the client.
    Never,
    /// Recognised but deliberately ignored.
    Unhandled,
}

impl SessionStatus {
    /// Returns `true` if a session in `current` may run a handler requiring `self`.
    #[must_use]
    pub const fn admits(self, current: Self) -> bool {
        match self {
            Self::Never | Self::Unhandled => false,
            Self::LoggedInOrRecentlyLoggedOut => {
                matches!(current, Self::LoggedIn | Self::LoggedInOrRecentlyLoggedOut)
            }
            Self::Authed => true,
            Self::LoggedIn => matches!(current, Self::LoggedIn),
            Self::Transfer => matches!(current, Self::Transfer),
        }
    }
}

/// Errors raised while building an opcode table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// An opcode was registered twice in the same direction.
    #[error("opcode {opcode} registered twice ({first} and {second})")]
    DuplicateOpcode {
        opcode: Opcode,
        first: &'static str,
        second: &'static str,
    },
}

/// Errors raised while dispatching an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No handler is registered for the opcode.
    #[error("no handler for opcode {opcode}")]
    UnknownOpcode { opcode: Opcode },

    /// The opcode is known but not accepted in the current session state.
    #[error("{name} ({opcode}) requires {required:?}, session is {current:?}")]
    StatusMismatch {
        opcode: Opcode,
        name: &'static str,
        required: SessionStatus,
        current: SessionStatus,
    },

    /// The payload failed to decode.
    #[error("failed to decode {name} ({opcode}): {source}")]
    Decode {
        opcode: Opcode,
        name: &'static str,
        #[source]
        source: DecodeError,
    },
}

type HandlerFn<C> = dyn Fn(&mut C, &[u8], &Limits) -> Result<(), DecodeError> + Send + Sync;

struct InboundEntry<C> {
    name: &'static str,
    status: SessionStatus,
    handler: Box<HandlerFn<C>>,
}

/// Metadata for an outbound opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundEntry {
    /// Human-readable name.
    pub name: &'static str,
    /// Channel the message is sent on.
    pub connection: ConnectionType,
}

/// Immutable opcode-to-handler mapping, built once at startup.
///
/// `C` is the handler context (typically the session). The table holds no
/// mutable state, so one instance can serve every connection concurrently.
pub struct OpcodeTable<C> {
    inbound: HashMap<Opcode, InboundEntry<C>>,
    outbound: HashMap<Opcode, OutboundEntry>,
    limits: Limits,
}

impl<C> fmt::Debug for OpcodeTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeTable")
            .field("inbound", &self.inbound.len())
            .field("outbound", &self.outbound.len())
            .field("limits", &self.limits)
            .finish()
    }
}

impl<C> OpcodeTable<C> {
    /// Starts a table builder.
    #[must_use]
    pub fn builder(limits: Limits) -> OpcodeTableBuilder<C> {
        OpcodeTableBuilder {
            table: Self {
                inbound: HashMap::new(),
                outbound: HashMap::new(),
                limits,
            },
            error: None,
        }
    }

    /// Limits applied to every decode.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Name of an inbound or outbound opcode, if registered.
    #[must_use]
    pub fn name(&self, opcode: Opcode) -> Option<&'static str> {
        self.inbound
            .get(&opcode)
            .map(|entry| entry.name)
            .or_else(|| self.outbound.get(&opcode).map(|entry| entry.name))
    }

    /// Metadata for an outbound opcode.
    #[must_use]
    pub fn outbound(&self, opcode: Opcode) -> Option<&OutboundEntry> {
        self.outbound.get(&opcode)
    }

    /// Required session status for an inbound opcode.
    #[must_use]
    pub fn inbound_status(&self, opcode: Opcode) -> Option<SessionStatus> {
        self.inbound.get(&opcode).map(|entry| entry.status)
    }

    /// Decodes `frame` with its registered message type and runs the handler.
    pub fn dispatch(
        &self,
        ctx: &mut C,
        frame: &InboundFrame<'_>,
        current: SessionStatus,
    ) -> Result<(), DispatchError> {
        let opcode = frame.opcode;
        let Some(entry) = self.inbound.get(&opcode) else {
            warn!(%opcode, len = frame.payload.len(), "unknown opcode");
            return Err(DispatchError::UnknownOpcode { opcode });
        };
        if entry.status == SessionStatus::Unhandled {
            debug!(%opcode, name = entry.name, "ignoring unhandled opcode");
            return Ok(());
        }
        if !entry.status.admits(current) {
            warn!(%opcode, name = entry.name, required = ?entry.status, ?current, "opcode rejected for session state");
            return Err(DispatchError::StatusMismatch {
                opcode,
                name: entry.name,
                required: entry.status,
                current,
            });
        }
        (entry.handler)(ctx, frame.payload, &self.limits).map_err(|source| {
            debug!(%opcode, name = entry.name, error = %source, "decode failed");
            DispatchError::Decode {
                opcode,
                name: entry.name,
                source,
            }
        })
    }
}

/// Builder for [`OpcodeTable`].
pub struct OpcodeTableBuilder<C> {
    table: OpcodeTable<C>,
    error: Option<TableError>,
}

impl<C: 'static> OpcodeTableBuilder<C> {
    /// Registers a decodable message and its handler.
    #[must_use]
    pub fn inbound<M, F>(mut self, name: &'static str, status: SessionStatus, handler: F) -> Self
    where
        M: Decodable + 'static,
        F: Fn(&mut C, M) + Send + Sync + 'static,
    {
        let opcode = M::OPCODE;
        if let Some(existing) = self.table.inbound.get(&opcode) {
            self.record(TableError::DuplicateOpcode {
                opcode,
                first: existing.name,
                second: name,
            });
            return self;
        }
        let erased = move |ctx: &mut C, payload: &[u8], limits: &Limits| -> Result<(), DecodeError> {
            let message = decode_message::<M>(payload, limits)?;
            handler(ctx, message);
            Ok(())
        };
        self.table.inbound.insert(
            opcode,
            InboundEntry {
                name,
                status,
                handler: Box::new(erased),
            },
        );
        self
    }

    /// Registers an opcode that is recognised but ignored.
    #[must_use]
    pub fn unhandled(mut self, opcode: Opcode, name: &'static str) -> Self {
        if let Some(existing) = self.table.inbound.get(&opcode) {
            self.record(TableError::DuplicateOpcode {
                opcode,
                first: existing.name,
                second: name,
            });
            return self;
        }
        self.table.inbound.insert(
            opcode,
            InboundEntry {
                name,
                status: SessionStatus::Unhandled,
                handler: Box::new(|_: &mut C, _: &[u8], _: &Limits| Ok::<(), DecodeError>(())),
            },
        );
        self
    }

    /// Registers an outbound opcode.
    #[must_use]
    pub fn outbound(mut self, opcode: Opcode, name: &'static str, connection: ConnectionType) -> Self {
        if let Some(existing) = self.table.outbound.get(&opcode) {
            self.record(TableError::DuplicateOpcode {
                opcode,
                first: existing.name,
                second: name,
            });
            return self;
        }
        self.table
            .outbound
            .insert(opcode, OutboundEntry { name, connection });
        self
    }

    /// Finishes the table, reporting the first registration error.
    pub fn build(self) -> Result<OpcodeTable<C>, TableError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.table),
        }
    }

    fn record(&mut self, err: TableError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
