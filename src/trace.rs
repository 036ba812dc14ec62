#[cfg(feature = "tracing")]
mod imp {
    pub(crate) use tracing::trace;
}

#[cfg(not(feature = "tracing"))]
mod imp {
    /// Borrows every field value so call sites compile the same way with
    /// tracing disabled, then emits nothing.
    macro_rules! trace {
        ($($field:ident = $value:expr,)* $message:literal) => {{
            $(let _ = &$value;)*
        }};
    }

    pub(crate) use trace;
}

pub(crate) use imp::*;

#[cfg(test)]
mod tests {
    use super::trace;

    #[test]
    fn fields_are_accepted_in_every_configuration() {
        let op: &'static str = "fmap";
        let settled: Result<(), ()> = Ok(());
        trace!(op = op, "deferred link recorded");
        trace!(op = op, resolved = settled.is_ok(), "running settle callback");
    }
}
