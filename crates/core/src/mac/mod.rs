/// A macro that allows lazily parsing a value from the environment variable,
/// with a fallback default value if the variable is not set or parsing fails.
///
/// # Parameters
///
/// - `$key`: An expression representing the name of the environment variable.
/// - `$t`: The type of the value to be parsed.
/// - `$default`: The default value to fall back to if the environment variable is not set or
///   parsing fails.
///
/// # Return Value
///
/// A lazy static variable of type `std::sync::LazyLock`, which holds the parsed
/// value from the environment variable or the default value.
#[macro_export]
macro_rules! lazy_env_parse {
	// With no default specified
	($key:expr, Option<String>) => {
		std::sync::LazyLock::new(|| std::env::var($key).ok())
	};
	// With a closure for the default value
	($key:expr, $t:ty, || $default:expr) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or_else(|| $default)
		})
	};
	// With a static expression for the default value
	($key:expr, $t:ty, $default:expr) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or($default)
		})
	};
}

/// Parses a number of milliseconds from the environment into a `Duration`,
/// falling back to the given default.
macro_rules! lazy_env_millis {
	($key:expr, $default:expr) => {
		std::sync::LazyLock::new(|| {
			let ms = std::env::var($key).ok().and_then(|s| s.parse::<u64>().ok()).unwrap_or($default);
			std::time::Duration::from_millis(ms)
		})
	};
}
