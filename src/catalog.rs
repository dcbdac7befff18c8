// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The PJLink command catalog: immutable request templates (spec §4.1).
//!
//! Every request takes the form `%<class><tag> <param>\r`. Commands with
//! variable parameters reserve placeholder `0x00` bytes at fixed offsets;
//! callers must clone the template via [`Command::patched`] before writing
//! into those offsets — the catalog entry itself is never mutated.

/// A single PJLink command template.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// Exact request bytes, `\r`-terminated. Write-queries embed `'?'`.
    pub bytes: &'static [u8],
    /// The 4-character tag PJLink echoes back in a normal reply, e.g. `"POWR"`.
    pub tag: &'static str,
    /// Indices within `bytes` that are mutable parameter placeholders.
    pub parameter_offsets: &'static [usize],
}

impl Command {
    /// Clone the template and overwrite each parameter offset with the
    /// corresponding byte from `params`, in order.
    ///
    /// Panics if `params.len() != self.parameter_offsets.len()` — this is a
    /// programmer error in the catalog/dispatcher pairing, not a runtime
    /// condition callers recover from.
    pub fn patched(&self, params: &[u8]) -> Vec<u8> {
        assert_eq!(
            params.len(),
            self.parameter_offsets.len(),
            "parameter count mismatch for {}",
            self.tag
        );
        let mut bytes = self.bytes.to_vec();
        for (&offset, &byte) in self.parameter_offsets.iter().zip(params) {
            bytes[offset] = byte;
        }
        bytes
    }
}

/// The empty "blank" exchange used to scroll past stale replies and to probe
/// for the initial banner. Carries no tag of its own.
pub const BLANK: &[u8] = b"";

pub const CLSS_QUERY: Command =
    Command { bytes: b"%1CLSS ?\r", tag: "CLSS", parameter_offsets: &[] };

pub const POWR_QUERY: Command =
    Command { bytes: b"%1POWR ?\r", tag: "POWR", parameter_offsets: &[] };
pub const POWR_SET: Command =
    Command { bytes: b"%1POWR \0\r", tag: "POWR", parameter_offsets: &[7] };

pub const AVMT_QUERY: Command =
    Command { bytes: b"%1AVMT ?\r", tag: "AVMT", parameter_offsets: &[] };
pub const AVMT_SET: Command =
    Command { bytes: b"%1AVMT \0\0\r", tag: "AVMT", parameter_offsets: &[7, 8] };

pub const ERST_QUERY: Command =
    Command { bytes: b"%1ERST ?\r", tag: "ERST", parameter_offsets: &[] };
pub const LAMP_QUERY: Command =
    Command { bytes: b"%1LAMP ?\r", tag: "LAMP", parameter_offsets: &[] };
pub const NAME_QUERY: Command =
    Command { bytes: b"%1NAME ?\r", tag: "NAME", parameter_offsets: &[] };
pub const INF1_QUERY: Command =
    Command { bytes: b"%1INF1 ?\r", tag: "INF1", parameter_offsets: &[] };
pub const INF2_QUERY: Command =
    Command { bytes: b"%1INF2 ?\r", tag: "INF2", parameter_offsets: &[] };
pub const INFO_QUERY: Command =
    Command { bytes: b"%1INFO ?\r", tag: "INFO", parameter_offsets: &[] };

pub const FREZ_QUERY: Command =
    Command { bytes: b"%2FREZ ?\r", tag: "FREZ", parameter_offsets: &[] };
pub const FREZ_SET: Command =
    Command { bytes: b"%2FREZ \0\r", tag: "FREZ", parameter_offsets: &[7] };

pub const INPT_QUERY: Command =
    Command { bytes: b"%2INPT ?\r", tag: "INPT", parameter_offsets: &[] };
pub const INPT_SET: Command =
    Command { bytes: b"%2INPT \0\0\r", tag: "INPT", parameter_offsets: &[7, 8] };

pub const SNUM_QUERY: Command =
    Command { bytes: b"%2SNUM ?\r", tag: "SNUM", parameter_offsets: &[] };
pub const SVER_QUERY: Command =
    Command { bytes: b"%2SVER ?\r", tag: "SVER", parameter_offsets: &[] };
pub const FILT_QUERY: Command =
    Command { bytes: b"%2FILT ?\r", tag: "FILT", parameter_offsets: &[] };
pub const RFIL_QUERY: Command =
    Command { bytes: b"%2RFIL ?\r", tag: "RFIL", parameter_offsets: &[] };
pub const RLMP_QUERY: Command =
    Command { bytes: b"%2RLMP ?\r", tag: "RLMP", parameter_offsets: &[] };
pub const RRES_QUERY: Command =
    Command { bytes: b"%2RRES ?\r", tag: "RRES", parameter_offsets: &[] };
pub const IRES_QUERY: Command =
    Command { bytes: b"%2IRES ?\r", tag: "IRES", parameter_offsets: &[] };

pub const INST_QUERY: Command =
    Command { bytes: b"%2INST ?\r", tag: "INST", parameter_offsets: &[] };
/// `INNM` has no `?` marker — the input code itself is the query parameter.
pub const INNM_QUERY: Command =
    Command { bytes: b"%2INNM \0\0\r", tag: "INNM", parameter_offsets: &[7, 8] };

/// Shared template for both speaker-volume directions; `'1'` patched = up, `'0'` = down.
pub const SVOL_CMD: Command =
    Command { bytes: b"%2SVOL \0\r", tag: "SVOL", parameter_offsets: &[7] };
/// Shared template for both microphone-volume directions.
pub const MVOL_CMD: Command =
    Command { bytes: b"%2MVOL \0\r", tag: "MVOL", parameter_offsets: &[7] };

/// Class 1 commands queried on every poll cycle, in order (spec §4.7 step 3).
pub const CLASS1_POLL_SEQUENCE: &[Command] =
    &[AVMT_QUERY, ERST_QUERY, LAMP_QUERY, NAME_QUERY, INF1_QUERY, INF2_QUERY, INFO_QUERY, POWR_QUERY];

/// Additional commands queried when the device is Class 2 (spec §4.7 step 4).
pub const CLASS2_POLL_SEQUENCE: &[Command] = &[
    SNUM_QUERY, SVER_QUERY, FILT_QUERY, RFIL_QUERY, RLMP_QUERY, INPT_QUERY, FREZ_QUERY, RRES_QUERY,
    IRES_QUERY,
];
