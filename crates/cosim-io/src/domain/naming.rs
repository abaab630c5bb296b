//! # Naming Rules
//!
//! Names of solvers, connections and registered functions travel as file
//! names and keys, so they share one character policy.

use cosim_types::{CoSimError, Info, Result};

/// Longest accepted name.
pub const MAX_NAME_LENGTH: usize = 1000;

/// Characters that may not appear in any name.
pub const DISALLOWED_CHARACTERS: [char; 13] =
    ['.', ',', ':', ';', '>', '<', '/', '\'', '|', '*', '!', '"', ' '];

/// Name of the control function that ends a `run` loop.
pub const EXIT_SIGNAL: &str = "exit";

/// Validate `entry` used as the value of setting `key`.
///
/// # Errors
///
/// `InvalidName` if `entry` is empty, longer than [`MAX_NAME_LENGTH`], or
/// contains one of [`DISALLOWED_CHARACTERS`].
pub fn check_entry(entry: &str, key: &str) -> Result<()> {
    if entry.is_empty() {
        return Err(CoSimError::invalid_name(
            entry,
            format!("\"{key}\" must not be empty"),
        ));
    }
    if entry.chars().count() > MAX_NAME_LENGTH {
        return Err(CoSimError::invalid_name(
            entry,
            format!("\"{key}\" is longer than {MAX_NAME_LENGTH} characters"),
        ));
    }
    if let Some(c) = entry.chars().find(|c| DISALLOWED_CHARACTERS.contains(c)) {
        return Err(CoSimError::invalid_name(
            entry,
            format!("\"{key}\" contains the character '{c}' which is not allowed"),
        ));
    }
    Ok(())
}

/// Connection name shared by both peers: the two names sorted and joined
/// with `_`, so both sides derive the same value.
///
/// # Errors
///
/// `InvalidName` if either name is invalid or both are equal.
pub fn create_connection_name(my_name: &str, connect_to: &str) -> Result<String> {
    check_entry(my_name, "my_name")?;
    check_entry(connect_to, "connect_to")?;
    if my_name == connect_to {
        return Err(CoSimError::invalid_name(
            my_name,
            "\"my_name\" and \"connect_to\" must differ, connecting to itself is not allowed",
        ));
    }

    Ok(if my_name < connect_to {
        format!("{my_name}_{connect_to}")
    } else {
        format!("{connect_to}_{my_name}")
    })
}

/// Connection addressed by `settings`: its `connection_name`, or the name
/// derived from `my_name` and `connect_to`.
///
/// # Errors
///
/// `InvalidName` if neither form is present and valid.
pub fn connection_name_from(settings: &Info) -> Result<String> {
    if settings.has("connection_name") {
        let name = settings.get_string("connection_name")?;
        check_entry(&name, "connection_name")?;
        return Ok(name);
    }
    create_connection_name(
        &settings.get_string_or("my_name", "")?,
        &settings.get_string_or("connect_to", "")?,
    )
}

/// Side that listens when no side was chosen explicitly.
#[must_use]
pub fn is_primary_by_name(my_name: &str, connect_to: &str) -> bool {
    my_name < connect_to
}
