//! Catalog of the native DVM functions a contract may call.
//!
//! Read-only: the context builder seeds its global scope from here. Costs
//! are carried for hosts that account gas; nothing in this crate uses them.

use super::DvmType;
use super::DvmType::{String as S, Uint64 as U, Unknown as X};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub args: &'static [(&'static str, DvmType)],
    /// `None` for functions that never return (`PANIC`).
    pub returns: Option<DvmType>,
    pub compute_cost: u64,
    pub storage_cost: u64,
}

const fn native(
    name: &'static str,
    args: &'static [(&'static str, DvmType)],
    returns: DvmType,
    compute_cost: u64,
) -> Builtin {
    Builtin {
        name,
        args,
        returns: Some(returns),
        compute_cost,
        storage_cost: 0,
    }
}

pub const BUILTINS: &[Builtin] = &[
    native("VERSION", &[("v", S)], U, 1000),
    native("LOAD", &[("key", X)], X, 5000),
    native("EXISTS", &[("key", X)], U, 5000),
    native("STORE", &[("key", X), ("value", X)], U, 10000),
    native("DELETE", &[("key", X)], U, 3000),
    native("MAPEXISTS", &[("key", X)], U, 1000),
    native("MAPGET", &[("key", X)], X, 1000),
    native("MAPSTORE", &[("key", X), ("value", X)], U, 1000),
    native("MAPDELETE", &[("key", X)], U, 1000),
    native("RANDOM", &[("limit", U)], U, 2500),
    native("SCID", &[], S, 2000),
    native("BLID", &[], S, 2000),
    native("TXID", &[], S, 2000),
    native("DERO", &[], S, 10000),
    native("BLOCK_HEIGHT", &[], U, 2000),
    native("BLOCK_TIMESTAMP", &[], U, 2500),
    native("SIGNER", &[], S, 5000),
    native("UPDATE_SC_CODE", &[("sc_code", S)], U, 5000),
    native("IS_ADDRESS_VALID", &[("address", S)], U, 50000),
    native("ADDRESS_RAW", &[("address", S)], S, 60000),
    native("ADDRESS_STRING", &[("p", S)], S, 50000),
    native("SEND_DERO_TO_ADDRESS", &[("a", S), ("amount", U)], U, 70000),
    native(
        "SEND_ASSET_TO_ADDRESS",
        &[("a", S), ("amount", U), ("asset", S)],
        U,
        90000,
    ),
    native("DEROVALUE", &[], U, 10000),
    native("ASSETVALUE", &[("asset", S)], U, 10000),
    native("ATOI", &[("s", S)], U, 5000),
    native("ITOA", &[("n", U)], S, 5000),
    native("SHA256", &[("s", S)], S, 25000),
    native("SHA3256", &[("s", S)], S, 25000),
    native("KECCAK256", &[("s", S)], S, 25000),
    native("HEX", &[("s", S)], S, 10000),
    native("HEXDECODE", &[("s", S)], S, 10000),
    native("MIN", &[("f", U), ("s", U)], U, 5000),
    native("MAX", &[("f", U), ("s", U)], U, 5000),
    native("STRLEN", &[("s", S)], U, 20000),
    native("SUBSTR", &[("s", S), ("offset", U), ("length", U)], S, 20000),
    Builtin {
        name: "PANIC",
        args: &[],
        returns: None,
        compute_cost: 10000,
        storage_cost: 0,
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}
