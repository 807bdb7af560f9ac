use crate::cli::{DecodeArgs, GenerateArgs};
use anyhow::{bail, Context};
use keyforge_generator::Generator;
use keyforge_snowflake::{DecodedId, Snowflake, SnowflakeId, SnowflakeSettings};
use std::io::Write;
use tracing::{info, warn};

pub fn generate(args: &GenerateArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let settings = SnowflakeSettings::builder()
        .node_id(args.node_id)
        .start_epoch(args.epoch)
        .backward_clock(args.backward_clock.into())
        .build();
    let generator = Snowflake::new(settings).context("failed to start id generator")?;

    info!(
        node_id = %generator.node_id(),
        epoch = %generator.start_epoch(),
        count = args.count,
        backward_clock = %args.backward_clock,
        "minting ids"
    );

    for _ in 0..args.count {
        let id = generator.generate().context("failed to mint id")?;
        writeln!(out, "{id}")?;
    }

    Ok(())
}

pub fn decode(args: &DecodeArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let mut failures = 0;

    for raw in &args.ids {
        let id = match raw.parse::<SnowflakeId>() {
            Ok(id) => id,
            Err(err) => {
                warn!(id = %raw, error = %err, "not a valid id");
                failures += 1;
                continue;
            }
        };

        let decoded = id.decode(args.epoch);
        if args.json {
            serde_json::to_writer(&mut *out, &decoded)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", render_text(&decoded))?;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} ids could not be decoded", args.ids.len());
    }
    Ok(())
}

fn render_text(decoded: &DecodedId) -> String {
    format!(
        "{}\ttimestamp={}\tnode={}\tsequence={}",
        decoded.id, decoded.timestamp, decoded.node_id, decoded.sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BackwardClockArg;
    use jiff::Timestamp;
    use keyforge_snowflake::{decode_node, NodeId, DEFAULT_EPOCH};

    fn decode_args(ids: &[&str], json: bool) -> DecodeArgs {
        DecodeArgs {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            epoch: DEFAULT_EPOCH,
            json,
        }
    }

    #[test]
    fn generate_prints_increasing_ids_for_node() {
        let args = GenerateArgs {
            node_id: NodeId::from_raw(1025),
            epoch: DEFAULT_EPOCH,
            count: 10,
            backward_clock: BackwardClockArg::Wait,
        };
        let mut out = Vec::new();
        generate(&args, &mut out).unwrap();

        let ids: Vec<u64> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| line.parse().unwrap())
            .collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(ids.iter().all(|id| decode_node(*id) == 1));
    }

    #[test]
    fn generate_rejects_future_epoch() {
        let args = GenerateArgs {
            node_id: NodeId::from_raw(0),
            epoch: "2999-01-01T00:00:00Z".parse().unwrap(),
            count: 1,
            backward_clock: BackwardClockArg::Wait,
        };
        let mut out = Vec::new();
        assert!(generate(&args, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn decode_prints_text_lines() {
        let id = (123_u64 << 22) | (1 << 12) | 2;
        let mut out = Vec::new();
        decode(&decode_args(&[id.to_string().as_str()], false), &mut out).unwrap();

        let expected_time = Timestamp::from_millisecond(1_640_995_200_123).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{id}\ttimestamp={expected_time}\tnode=1\tsequence=2\n")
        );
    }

    #[test]
    fn decode_prints_json_lines() {
        let id = (123_u64 << 22) | (1 << 12) | 2;
        let mut out = Vec::new();
        decode(&decode_args(&[id.to_string().as_str(), "0"], true), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"].as_u64(), Some(id));
        assert_eq!(lines[0]["node_id"].as_u64(), Some(1));
        assert_eq!(lines[0]["sequence"].as_u64(), Some(2));
        let timestamp: Timestamp = lines[0]["timestamp"].as_str().unwrap().parse().unwrap();
        assert_eq!(timestamp.as_millisecond(), 1_640_995_200_123);
        assert_eq!(lines[1]["id"].as_u64(), Some(0));
    }

    #[test]
    fn decode_reports_invalid_ids_but_prints_the_rest() {
        let mut out = Vec::new();
        let result = decode(&decode_args(&["42", "nope", "-1"], false), &mut out);

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "2 of 3 ids could not be decoded");
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
