/// Length of the run of bytes matching `$pattern` starting at `$offset`.
macro_rules! strspn {
    ($expression:expr, $pattern:pat $(if $guard:expr)?, $offset:expr $(,)?) => {{
        let offset = $offset;
        $expression[offset..]
            .iter()
            .position(|&b| !matches!(b, $pattern $(if $guard)?))
            .unwrap_or($expression.len() - offset)
    }};
}

/// Length of the run of bytes _not_ matching `$pattern` starting at `$offset`.
macro_rules! strcspn {
    ($expression:expr, $pattern:pat $(if $guard:expr)?, $offset:expr $(,)?) => {{
        let offset = $offset;
        $expression[offset..]
            .iter()
            .position(|&b| matches!(b, $pattern $(if $guard)?))
            .unwrap_or($expression.len() - offset)
    }};
}
