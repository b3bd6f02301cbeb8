#![doc = include_str!("../../../README.md")]

mod args;
mod exception;
mod represent;
mod signature;
mod snapshot;
mod tag;
mod value;

pub use crate::{
    args::{CallArgs, Kwargs, PosIter},
    exception::{format_exception, format_traceback, StackFrame},
    represent::represent,
    signature::{BoundArgs, Signature, SignatureUnavailable},
    snapshot::{extract, snapshot, FuncDecl, ParameterSnapshot, SignatureCache, StepCallable},
    tag::{host_tag, md5, now, platform_label, thread_tag, uuid4},
    value::Value,
};
