use super::Error;
use nix_parser::{AddressDescriptor, TxParser};
use nix_script::{ScriptClassifier, classifier::classify_with_rule, decode_spend_payload};
use serde_json::{Value, json};

/// Reports the matching rule along with the classification.
///
/// The rule name comes from the NIX rule set regardless of the parser's classifier.
pub fn classify<C: ScriptClassifier>(parser: &TxParser<C>, script: &[u8]) -> Result<Value, Error> {
    let (rule, _) = classify_with_rule(script, parser.params());
    let classification = parser.classifier().classify(script);

    Ok(json!({
        "rule": rule,
        "kind": classification.kind,
        "addresses": classification.addresses,
        "searchable": classification.searchable,
    }))
}

pub fn address<C: ScriptClassifier>(parser: &TxParser<C>, address: &str) -> Result<Value, Error> {
    let descriptor = parser.address_to_descriptor(address)?;
    Ok(json!({ "descriptor": descriptor.to_hex() }))
}

pub fn descriptor<C: ScriptClassifier>(
    parser: &TxParser<C>,
    descriptor: &[u8],
) -> Result<Value, Error> {
    let (addresses, searchable) =
        parser.descriptor_to_addresses(&AddressDescriptor::new(descriptor.to_vec()));
    Ok(json!({ "addresses": addresses, "searchable": searchable }))
}

pub fn zerocoin_value(script_sig: &[u8]) -> Result<Value, Error> {
    let payload = decode_spend_payload(script_sig)?;
    Ok(json!({
        "coin_spend_size": payload.coin_spend_size,
        "pubkey_len": payload.pubkey_len,
        "sig_len": payload.sig_len,
        "denomination": payload.denomination,
        "value_sat": payload.value().to_sat().to_string(),
    }))
}
