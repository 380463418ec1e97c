use cliloc::{Direction, FormatType, Locale, infer_format_from_extension};
use std::path::Path;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("Input file does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Input path is not a file: {}", path));
    }

    Ok(())
}

/// Validate a file name carries a supported extension and return its format
pub fn validate_file_type(path: &str, role: &str) -> Result<FormatType, String> {
    infer_format_from_extension(path).ok_or_else(|| {
        format!(
            "Unknown {} file type: {}. Expected .csv or one of: {}",
            role,
            path,
            supported_locales()
        )
    })
}

/// Validate the input/output pair and determine the conversion direction.
///
/// Both file types are checked before the pair is, so a bad input and a bad
/// output are reported together.
pub fn validate_conversion(input: &str, output: &str) -> Result<Direction, String> {
    let from = validate_file_type(input, "input");
    let to = validate_file_type(output, "output");

    match (from, to) {
        (Ok(from), Ok(to)) => Direction::from_formats(from, to).map_err(|_| {
            "Can only convert from cliloc to csv and csv to cliloc".to_string()
        }),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(input_error), Err(output_error)) => {
            Err(format!("{}\n{}", input_error, output_error))
        }
    }
}

/// Comma-separated list of the supported locale extensions.
pub fn supported_locales() -> String {
    Locale::ALL
        .iter()
        .map(|&locale| FormatType::Cliloc(locale).extension())
        .collect::<Vec<_>>()
        .join(", ")
}
