use std::str::FromStr;

use ethereum_log_decoder::{
    signature_hash, Decoded, EventDescriptor, LogDecoder, LogRecord, MalformedLog, Value,
};
use ethereum_types::{H160, H256, U256};
use pretty_assertions::assert_eq;

const HOLDER: &str = "d03dd4c1a8a21f1e5c0d0f2fbcb7b3f8c2d1aeb2";

fn erc20_decoder() -> LogDecoder {
    let events: Vec<EventDescriptor> = serde_json::from_str(include_str!("../demos/erc20_events.json"))
        .expect("failed to parse ERC-20 events");

    LogDecoder::new(events).expect("failed to build decoder")
}

fn word(addr: &str) -> H256 {
    H256::from_str(&format!("{:0>64}", addr)).unwrap()
}

fn uint_data(value: U256) -> Vec<u8> {
    let mut data = vec![0u8; 32];
    value.to_big_endian(&mut data);
    data
}

#[test]
fn transfer() {
    let decoder = erc20_decoder();
    let tokens = U256::from_dec_str("2804000000000000000000").unwrap();

    let log = LogRecord {
        topics: vec![
            signature_hash("Transfer(address,address,uint256)"),
            word(HOLDER),
            word(HOLDER),
        ],
        data: uint_data(tokens),
        block_number: 6_383_820,
        log_index: 54,
    };

    let event = decoder
        .decode(&log)
        .expect("decode failed")
        .into_event()
        .expect("Transfer not recognized");

    let holder = H160::from_str(HOLDER).unwrap();
    assert_eq!(event.name, "Transfer");
    assert_eq!(event.block_number, 6_383_820);
    assert_eq!(event.log_index, 54);
    assert_eq!(event.get("from"), Some(&Value::Address(holder)));
    assert_eq!(event.get("to"), Some(&Value::Address(holder)));
    assert_eq!(event.get("tokens"), Some(&Value::Uint(tokens, 256)));
    assert_eq!(
        event.params.keys().collect::<Vec<_>>(),
        vec!["from", "to", "tokens"]
    );
}

#[test]
fn transfer_keeps_from_and_to_apart() {
    let decoder = erc20_decoder();
    let to = "00000000000000000000000000000000000000ff";

    let log = LogRecord {
        topics: vec![
            signature_hash("Transfer(address,address,uint256)"),
            word(HOLDER),
            word(to),
        ],
        data: uint_data(U256::one()),
        block_number: 1,
        log_index: 0,
    };

    let event = decoder.decode(&log).unwrap().into_event().unwrap();

    assert_eq!(
        event.get("from").and_then(Value::as_address),
        Some(H160::from_str(HOLDER).unwrap())
    );
    assert_eq!(
        event.get("to").and_then(Value::as_address),
        Some(H160::from_low_u64_be(0xff))
    );
}

#[test]
fn approval_keeps_full_precision() {
    let decoder = erc20_decoder();
    let literal = "12345678901234567890123456789012345678901234567890123456789012345678";
    let tokens = U256::from_dec_str(literal).unwrap();

    let log = LogRecord {
        topics: vec![
            signature_hash("Approval(address,address,uint256)"),
            word(HOLDER),
            word(HOLDER),
        ],
        data: uint_data(tokens),
        block_number: 6_383_829,
        log_index: 12,
    };

    let event = decoder.decode(&log).unwrap().into_event().unwrap();

    assert_eq!(event.name, "Approval");
    assert_eq!(event.get("tokens").and_then(Value::as_u256), Some(tokens));
    assert_eq!(event.get("tokens").map(ToString::to_string), Some(literal.to_string()));
}

#[test]
fn unknown_signature_is_not_an_error() {
    let decoder = erc20_decoder();
    let sync = signature_hash("Sync(uint112,uint112)");

    let log = LogRecord {
        topics: vec![sync],
        data: vec![0u8; 64],
        block_number: 6_383_840,
        log_index: 3,
    };

    assert_eq!(decoder.decode(&log), Ok(Decoded::Unrecognized { topic: Some(sync) }));
}

#[test]
fn missing_recipient_topic_is_malformed() {
    let decoder = erc20_decoder();

    let log = LogRecord {
        topics: vec![signature_hash("Transfer(address,address,uint256)"), word(HOLDER)],
        data: uint_data(U256::one()),
        block_number: 1,
        log_index: 0,
    };

    let err = decoder.decode(&log).unwrap_err();

    assert_eq!(err.event(), "Transfer");
    assert_eq!(
        err,
        MalformedLog::TopicCount {
            event: "Transfer".to_string(),
            expected: 3,
            actual: 2,
        }
    );
}

#[test]
fn replay_sample_logs() {
    let decoder = erc20_decoder();
    let logs: Vec<LogRecord> = serde_json::from_str(include_str!("../demos/erc20_logs.json"))
        .expect("failed to parse sample logs");

    let decoded = decoder
        .decode_all(&logs)
        .collect::<Result<Vec<_>, _>>()
        .expect("sample logs are well formed");

    let names: Vec<_> = decoded
        .iter()
        .map(|d| d.event().map(|event| event.name.as_str()))
        .collect();
    assert_eq!(names, vec![Some("Transfer"), Some("Approval"), None]);

    let transfer = decoded[0].event().unwrap();
    assert_eq!(
        transfer.get("tokens").map(ToString::to_string),
        Some("2804000000000000000000".to_string())
    );

    let json = serde_json::to_value(transfer).unwrap();
    assert_eq!(json["name"], "Transfer");
    assert_eq!(json["blockNumber"], 6_383_820);
    assert_eq!(json["params"]["tokens"], "2804000000000000000000");
    assert_eq!(
        json["params"]["from"],
        "0xd03dd4c1a8a21f1e5c0d0f2fbcb7b3f8c2d1aeb2"
    );
}
