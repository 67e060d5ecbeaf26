use clap::Parser;

/// Parses the command line arguments; clap's `env` attributes fill in unset flags.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}

/// Parse `T` from the command line, exiting with clap's usage message on error.
pub fn parse_args_or_exit<T: Parser>() -> T {
    match parse_args::<T>() {
        Ok(args) => args,
        Err(e) => e.exit(),
    }
}
