//! The special parameter registry.
//!
//! A static table of built-in bindings, installed into the level-0 table
//! exactly once at engine bootstrap. Each entry pins its record to an
//! interpreter cell through a `Var` dispatch variant; the colon-tied
//! scalars get the `Tied` variant and a link to their array cell.

use crate::flags::ParamFlags;
use crate::gsu::{Gsu, VarBinding};
use crate::state::InterpreterState;
use crate::table::{Param, ParamTable, TieLink};
use crate::value::{ParamType, ParamValue};

/// One registry entry.
#[derive(Copy, Clone, Debug)]
pub struct SpecialDef {
    pub name: &'static str,
    pub ty: ParamType,
    pub flags: ParamFlags,
    pub gsu: Gsu,
    /// For tied scalars: the array cell's name and the join character.
    pub tied_to: Option<(&'static str, char)>,
}

const SPECIAL: ParamFlags = ParamFlags::SPECIAL;
const NO_IMPORT: ParamFlags = ParamFlags::SPECIAL.union(ParamFlags::DONT_IMPORT);
const IDENTITY: ParamFlags = NO_IMPORT.union(ParamFlags::RESTRICTED);
const TIED_RESTRICTED: ParamFlags = ParamFlags::SPECIAL
    .union(ParamFlags::TIED)
    .union(ParamFlags::RESTRICTED);

/// Every built-in binding, installed at bootstrap.
pub const SPECIALS: &[SpecialDef] = &[
    SpecialDef {
        name: "RANDOM",
        ty: ParamType::Integer,
        flags: NO_IMPORT,
        gsu: Gsu::Var(VarBinding::Random),
        tied_to: None,
    },
    SpecialDef {
        name: "SECONDS",
        ty: ParamType::Integer,
        flags: NO_IMPORT,
        gsu: Gsu::Var(VarBinding::Seconds { float: false }),
        tied_to: None,
    },
    SpecialDef {
        name: "UID",
        ty: ParamType::Integer,
        flags: IDENTITY,
        gsu: Gsu::Var(VarBinding::Uid),
        tied_to: None,
    },
    SpecialDef {
        name: "EUID",
        ty: ParamType::Integer,
        flags: IDENTITY,
        gsu: Gsu::Var(VarBinding::Euid),
        tied_to: None,
    },
    SpecialDef {
        name: "GID",
        ty: ParamType::Integer,
        flags: IDENTITY,
        gsu: Gsu::Var(VarBinding::Gid),
        tied_to: None,
    },
    SpecialDef {
        name: "EGID",
        ty: ParamType::Integer,
        flags: IDENTITY,
        gsu: Gsu::Var(VarBinding::Egid),
        tied_to: None,
    },
    SpecialDef {
        name: "USERNAME",
        ty: ParamType::Scalar,
        flags: IDENTITY,
        gsu: Gsu::Var(VarBinding::Username),
        tied_to: None,
    },
    SpecialDef {
        name: "PPID",
        ty: ParamType::Integer,
        flags: NO_IMPORT.union(ParamFlags::READONLY),
        gsu: Gsu::NullSet,
        tied_to: None,
    },
    SpecialDef {
        name: "HOME",
        ty: ParamType::Scalar,
        flags: SPECIAL,
        gsu: Gsu::Var(VarBinding::Home),
        tied_to: None,
    },
    SpecialDef {
        name: "TERM",
        ty: ParamType::Scalar,
        flags: SPECIAL,
        gsu: Gsu::Var(VarBinding::Term),
        tied_to: None,
    },
    SpecialDef {
        name: "TERMINFO",
        ty: ParamType::Scalar,
        flags: SPECIAL,
        gsu: Gsu::Var(VarBinding::Terminfo),
        tied_to: None,
    },
    SpecialDef {
        name: "TERMINFO_DIRS",
        ty: ParamType::Scalar,
        flags: SPECIAL,
        gsu: Gsu::Var(VarBinding::TerminfoDirs),
        tied_to: None,
    },
    SpecialDef {
        name: "IFS",
        ty: ParamType::Scalar,
        flags: NO_IMPORT.union(ParamFlags::DEFAULTED),
        gsu: Gsu::Var(VarBinding::Ifs),
        tied_to: None,
    },
    SpecialDef {
        name: "WORDCHARS",
        ty: ParamType::Scalar,
        flags: NO_IMPORT.union(ParamFlags::DEFAULTED),
        gsu: Gsu::Var(VarBinding::Wordchars),
        tied_to: None,
    },
    SpecialDef {
        name: "SHLVL",
        ty: ParamType::Integer,
        flags: SPECIAL,
        gsu: Gsu::Var(VarBinding::Shlvl),
        tied_to: None,
    },
    SpecialDef {
        name: "OPTIND",
        ty: ParamType::Integer,
        flags: NO_IMPORT,
        gsu: Gsu::Var(VarBinding::Optind),
        tied_to: None,
    },
    SpecialDef {
        name: "path",
        ty: ParamType::Array,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Var(VarBinding::PathArr),
        tied_to: None,
    },
    SpecialDef {
        name: "PATH",
        ty: ParamType::Scalar,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Tied,
        tied_to: Some(("path", ':')),
    },
    SpecialDef {
        name: "cdpath",
        ty: ParamType::Array,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Var(VarBinding::CdpathArr),
        tied_to: None,
    },
    SpecialDef {
        name: "CDPATH",
        ty: ParamType::Scalar,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Tied,
        tied_to: Some(("cdpath", ':')),
    },
    SpecialDef {
        name: "fpath",
        ty: ParamType::Array,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Var(VarBinding::FpathArr),
        tied_to: None,
    },
    SpecialDef {
        name: "FPATH",
        ty: ParamType::Scalar,
        flags: TIED_RESTRICTED,
        gsu: Gsu::Tied,
        tied_to: Some(("fpath", ':')),
    },
];

/// Install the registry into the table. Called once at bootstrap; every
/// record lands at level 0 and never leaves the table afterwards.
pub fn install(table: &mut ParamTable, state: &InterpreterState) {
    for def in SPECIALS {
        let value = match def.gsu {
            // The dispatch discards writes, so seed the stored value once.
            Gsu::NullSet if def.name == "PPID" => ParamValue::Integer(state.ids.ppid),
            _ => ParamValue::empty(def.ty),
        };
        let mut param = Param {
            name: def.name.to_owned(),
            flags: def.flags,
            value,
            gsu: def.gsu,
            level: 0,
            shadow: None,
            env_entry: None,
            tie: None,
            base: 0,
            width: 0,
            stash: None,
        };
        if let Some((partner, join)) = def.tied_to {
            param.tie = Some(TieLink {
                partner: partner.to_owned(),
                join,
            });
        }
        table.install(param);
    }
    // Back-link each array cell to its scalar half.
    for def in SPECIALS {
        let Some((partner, join)) = def.tied_to else {
            continue;
        };
        if let Some(array_id) = table.lookup(partner) {
            table.param_mut(array_id).tie = Some(TieLink {
                partner: def.name.to_owned(),
                join,
            });
        }
    }
    tracing::debug!(count = SPECIALS.len(), "installed special parameters");
}

/// Find a registry definition by name.
pub fn find(name: &str) -> Option<&'static SpecialDef> {
    SPECIALS.iter().find(|def| def.name == name)
}
