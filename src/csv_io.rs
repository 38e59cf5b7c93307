//! CSV ingestion and emission: the bit-level interface contract in front of
//! the matching core. Peripheral to the engine itself — see module docs on
//! [`crate::engine`] and [`crate::instrument_manager`] for the actual core.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::engine::OrderAction;
use crate::errors::EngineError;
use crate::event::OrderEvent;
use crate::instrument_manager::InstrumentManager;
use crate::types::{Action, OrderType, Side};

pub const OUTPUT_HEADER: &str = "timestamp,order_id,instrument,side,type,quantity,price,action,status,executed_quantity,execution_price,counterparty_id";

#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub lines_processed: usize,
    pub parse_errors: usize,
    pub engine_errors: usize,
}

impl IngestStats {
    pub fn total_errors(&self) -> usize {
        self.parse_errors + self.engine_errors
    }
}

fn trim_field(field: &str) -> &str {
    field.trim_matches(|c: char| c == ' ' || c == '\t')
}

fn parse_side(field: &str, line: usize) -> Result<Side, EngineError> {
    match field {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => Err(EngineError::CsvParsing {
            line,
            reason: format!("unknown side `{other}`"),
        }),
    }
}

fn parse_order_type(field: &str, line: usize) -> Result<OrderType, EngineError> {
    match field {
        "LIMIT" => Ok(OrderType::Limit),
        "MARKET" => Ok(OrderType::Market),
        other => Err(EngineError::CsvParsing {
            line,
            reason: format!("unknown order type `{other}`"),
        }),
    }
}

fn parse_action(field: &str, line: usize) -> Result<Action, EngineError> {
    match field {
        "NEW" => Ok(Action::New),
        "MODIFY" => Ok(Action::Modify),
        "CANCEL" => Ok(Action::Cancel),
        other => Err(EngineError::CsvParsing {
            line,
            reason: format!("unknown action `{other}`"),
        }),
    }
}

/// Parses one data row (not the header) into an [`OrderAction`].
///
/// Field order: timestamp, order_id, instrument, side, type, quantity,
/// price, action. `price` is ignored and forced to 0 for MARKET rows,
/// whatever text it holds — including `na` or empty.
pub fn parse_order_action(line: &str, line_no: usize) -> Result<OrderAction, EngineError> {
    let fields: Vec<&str> = line.split(',').map(trim_field).collect();
    if fields.len() < 8 {
        return Err(EngineError::CsvParsing {
            line: line_no,
            reason: format!("expected at least 8 fields, got {}", fields.len()),
        });
    }

    let timestamp = fields[0].parse().map_err(|_| EngineError::CsvParsing {
        line: line_no,
        reason: format!("invalid timestamp `{}`", fields[0]),
    })?;
    let order_id = fields[1].parse().map_err(|_| EngineError::CsvParsing {
        line: line_no,
        reason: format!("invalid order_id `{}`", fields[1]),
    })?;
    let instrument = fields[2].to_string();
    let side = parse_side(fields[3], line_no)?;
    let order_type = parse_order_type(fields[4], line_no)?;
    let quantity = fields[5].parse().map_err(|_| EngineError::CsvParsing {
        line: line_no,
        reason: format!("invalid quantity `{}`", fields[5]),
    })?;
    let price = match order_type {
        OrderType::Market => 0.0,
        OrderType::Limit => fields[6]
            .parse::<f64>()
            .ok()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| EngineError::CsvParsing {
                line: line_no,
                reason: format!("invalid limit price `{}`", fields[6]),
            })?,
    };
    let action = parse_action(fields[7], line_no)?;

    Ok(OrderAction {
        timestamp,
        order_id,
        instrument,
        side,
        order_type,
        quantity,
        price,
        action,
    })
}

/// Reads `input_path` line by line, skipping the header, feeding each row
/// into `manager`. Malformed rows and engine-rejected rows are reported via
/// `on_error` and otherwise skipped; only file-level I/O failure is fatal.
pub fn ingest_and_process(
    input_path: &Path,
    manager: &mut InstrumentManager,
    mut on_error: impl FnMut(usize, &str),
) -> Result<IngestStats, EngineError> {
    let file = File::open(input_path).map_err(|_| EngineError::FileIo {
        path: input_path.display().to_string(),
        op: "open".to_string(),
    })?;
    let reader = BufReader::new(file);
    let mut stats = IngestStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|_| EngineError::FileIo {
            path: input_path.display().to_string(),
            op: "read".to_string(),
        })?;
        if line_no == 1 || line.trim().is_empty() {
            continue;
        }
        stats.lines_processed += 1;
        match parse_order_action(&line, line_no) {
            Ok(action) => {
                if let Err(e) = manager.process_order(action) {
                    stats.engine_errors += 1;
                    on_error(line_no, &e.to_string());
                }
            }
            Err(e) => {
                stats.parse_errors += 1;
                on_error(line_no, &e.to_string());
            }
        }
    }
    Ok(stats)
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Writes every event, in the order given, as one CSV file with header.
pub fn write_events(output_path: &Path, events: &[OrderEvent]) -> Result<(), EngineError> {
    let file = File::create(output_path).map_err(|_| EngineError::FileIo {
        path: output_path.display().to_string(),
        op: "create".to_string(),
    })?;
    let mut writer = BufWriter::new(file);
    let io_err = |op: &str| EngineError::FileIo {
        path: output_path.display().to_string(),
        op: op.to_string(),
    };

    writeln!(writer, "{OUTPUT_HEADER}").map_err(|_| io_err("write"))?;
    for event in events {
        let price = match event.order_type {
            OrderType::Market => 0.0,
            OrderType::Limit => event.price,
        };
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            event.timestamp,
            event.order_id,
            event.instrument,
            event.side,
            event.order_type,
            event.display_qty,
            format_price(price),
            event.action,
            event.status,
            event.executed_qty,
            format_price(event.execution_price),
            event.counterparty_id,
        )
        .map_err(|_| io_err("write"))?;
    }
    writer.flush().map_err(|_| io_err("write"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_limit_row() {
        let action =
            parse_order_action("1000,1,AAPL,BUY,LIMIT,100,150.00,NEW", 2).unwrap();
        assert_eq!(action.timestamp, 1000);
        assert_eq!(action.order_id, 1);
        assert_eq!(action.instrument, "AAPL");
        assert_eq!(action.side, Side::Buy);
        assert_eq!(action.order_type, OrderType::Limit);
        assert_eq!(action.quantity, 100);
        assert_eq!(action.price, 150.0);
        assert_eq!(action.action, Action::New);
    }

    #[test]
    fn market_price_is_forced_to_zero_for_any_input() {
        for raw in ["na", "", "-5", "abc"] {
            let line = format!("1000,1,AAPL,BUY,MARKET,100,{raw},NEW");
            let action = parse_order_action(&line, 2).unwrap();
            assert_eq!(action.price, 0.0);
        }
    }

    #[test]
    fn limit_price_must_be_positive() {
        let err = parse_order_action("1000,1,AAPL,BUY,LIMIT,100,0,NEW", 2).unwrap_err();
        assert!(matches!(err, EngineError::CsvParsing { line: 2, .. }));
    }

    #[test]
    fn fields_are_trimmed_of_spaces_and_tabs() {
        let action =
            parse_order_action(" 1000 , 1 , AAPL , BUY , LIMIT , 100 , 150.00 , NEW ", 2)
                .unwrap();
        assert_eq!(action.instrument, "AAPL");
    }

    #[test]
    fn too_few_fields_is_a_parsing_error() {
        let err = parse_order_action("1000,1,AAPL", 5).unwrap_err();
        assert!(matches!(err, EngineError::CsvParsing { line: 5, .. }));
    }

    #[test]
    fn unknown_action_word_is_a_parsing_error() {
        let err = parse_order_action("1000,1,AAPL,BUY,LIMIT,100,150.00,REPLACE", 2).unwrap_err();
        assert!(matches!(err, EngineError::CsvParsing { .. }));
    }
}
