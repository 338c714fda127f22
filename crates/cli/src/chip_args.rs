// `--chip` argument parsing.
//
// COL=VALUE is a column chip when COL names a column of the table; anything
// else (including text containing '=' with an unknown prefix) is a global term.

use facetbar_engine::Suggestion;

use crate::CliError;

pub fn parse_chip(arg: &str, columns: &[String]) -> Result<Suggestion, CliError> {
    if arg.is_empty() {
        return Err(CliError::args("empty --chip value"));
    }

    if let Some((column, value)) = arg.split_once('=') {
        let column = column.trim();
        if columns.iter().any(|c| c == column) {
            return Ok(Suggestion::column(column, value));
        }
    }

    Ok(Suggestion::global(arg))
}

pub fn parse_chips(args: &[String], columns: &[String]) -> Result<Vec<Suggestion>, CliError> {
    args.iter().map(|arg| parse_chip(arg, columns)).collect()
}
