#![doc = include_str!("../../../README.md")]

mod diagnostics;
mod engine;
mod error;
pub mod flag;
mod labels;
pub mod lookup;
mod member;
mod options;

pub use crate::{
    diagnostics::{
        CollectDiagnostics, Diagnostic, DiagnosticKind, DiagnosticSink, NoDiagnostics, Operation, TracingDiagnostics,
    },
    engine::FlagEnum,
    error::EnumError,
    flag::{AsFlag, FlagValue, bit_for, is_subset, to_binary_string},
    labels::Labels,
    lookup::{Combo, KeyPattern, MembershipPredicate, Resolved},
    member::{Member, NONE_INDEX},
    options::{
        DEFAULT_FLAG_PREFIX, DEFAULT_NAME, DEFAULT_PREDICATE_SUFFIX, DEFAULT_SENTINEL_NAME, DEFAULT_SEPARATOR,
        EnumOptions,
    },
};
