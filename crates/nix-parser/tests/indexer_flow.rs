//! Drives the parser the way the indexer does: parse, store, reload and
//! resolve the addresses of every output.

use nix_parser::{AddressDescriptor, Error, TxParser, Vin, amount_to_big_int};
use nix_primitives::{Network, NetworkParams, label};
use nix_script::{ClassifyEvent, ClassifyObserver, NixScriptClassifier, ScriptKind};
use num_bigint::BigInt;
use std::sync::{Arc, Mutex};

const TX_HEX: &str = "0100000001f85264d11a747bdba77d411e5e4a3d35e3aeb5843b34a95234a2121ac65496bd000000006b483045022100dfa158fbd9773fab4f6f329c807e040af0c3a40967cbe01667169b914ed5ad960220061c5876364caa3e3c9c990ad2b4cc8b1a53d4f954dbda8434b0e67cc8348ff6012103093865e1e132b33a2a5ed01c79d2edba3473826a66cb26b8311bfa42749c2190ffffffff02ec3f8a2a010000001976a91470dcef2a22575d7a8f0779fb1d6cdd48135bd22788ac3116491d000000001976a91471348f7780e955a2a60eba17ecc4c826ebc23a9888ac00000000";

#[derive(Default)]
struct Recorder(Mutex<Vec<ClassifyEvent>>);

impl ClassifyObserver for Recorder {
    fn on_classify(&self, event: &ClassifyEvent) {
        self.0.lock().unwrap().push(*event);
    }
}

#[test]
fn store_and_reload_transaction() {
    let parser = TxParser::for_network(Network::Mainnet).unwrap();
    let tx = parser.parse_tx_hex(TX_HEX).unwrap();

    let record = parser.pack_tx(&tx, 1_028_160, 1_551_246_710).unwrap();
    let (stored, height) = parser.unpack_tx(&record).unwrap();
    assert_eq!(height, 1_028_160);
    assert_eq!(stored.block_time, 1_551_246_710);
    assert_eq!(stored.vin, tx.vin);

    let total: BigInt = stored.vout.iter().map(|vout| &vout.value_sat).sum();
    assert_eq!(total, amount_to_big_int("54.99999773").unwrap());

    for vout in &stored.vout {
        let descriptor = AddressDescriptor::from_hex(&vout.script_hex).unwrap();
        let (addresses, searchable) = parser.descriptor_to_addresses(&descriptor);
        assert_eq!(addresses, vout.addresses);
        assert!(searchable);

        assert_eq!(parser.address_to_descriptor(&addresses[0]).unwrap(), descriptor);
    }

    match &stored.vin[0] {
        Vin::Standard { txid, vout, .. } => {
            assert_eq!(
                txid.to_string(),
                "bd9654c61a12a23452a9343b84b5aee3353d4a5e1e417da7db7b741ad16452f8"
            );
            assert_eq!(*vout, 0);
        }
        other => panic!("Unexpected input: {other:?}"),
    }
}

#[test]
fn observer_sees_every_output() {
    let recorder = Arc::new(Recorder::default());
    let classifier =
        NixScriptClassifier::new(NetworkParams::MAINNET).with_observer(recorder.clone());
    let parser = TxParser::with_classifier(classifier);

    parser.parse_tx_hex(TX_HEX).unwrap();

    let events = recorder.0.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.rule == "standard"
        && event.kind == ScriptKind::Standard
        && event.script_len == 25));
}

#[test]
fn pseudo_addresses_resolve_per_network() {
    for network in [Network::Mainnet, Network::Testnet] {
        let parser = TxParser::for_network(network).unwrap();
        for label in [label::STAKE, label::COINBASE, label::RINGCT, label::CTDATA] {
            let descriptor = parser.address_to_descriptor(label).unwrap();
            assert!(descriptor.is_sentinel());
            assert_eq!(
                parser.descriptor_to_addresses(&descriptor),
                (vec![label.to_string()], false)
            );
        }
        assert!(matches!(
            parser.address_to_descriptor(label::ZEROCOIN_SPEND),
            Err(Error::InvalidAddress(_))
        ));
    }
}
