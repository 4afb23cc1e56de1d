use super::Error;
use nix_parser::TxParser;
use nix_script::ScriptClassifier;
use serde_json::{Value, json};

pub fn parse_tx<C: ScriptClassifier>(parser: &TxParser<C>, raw: &[u8]) -> Result<Value, Error> {
    Ok(serde_json::to_value(parser.parse_tx(raw)?)?)
}

pub fn parse_tx_json<C: ScriptClassifier>(parser: &TxParser<C>, json: &str) -> Result<Value, Error> {
    Ok(serde_json::to_value(parser.parse_tx_from_json(json)?)?)
}

pub fn parse_block<C: ScriptClassifier>(parser: &TxParser<C>, raw: &[u8]) -> Result<Value, Error> {
    let block = parser.parse_block(raw)?;

    tracing::info!(
        hash = %block.hash,
        height = ?block.height,
        txs = block.txs.len(),
        size = block.size,
        "Parsed block"
    );

    Ok(serde_json::to_value(block)?)
}

pub fn pack<C: ScriptClassifier>(
    parser: &TxParser<C>,
    raw: &[u8],
    height: u32,
    block_time: i64,
) -> Result<Value, Error> {
    let tx = parser.parse_tx(raw)?;
    let packed = parser.pack_tx(&tx, height, block_time)?;
    Ok(json!({ "txid": tx.txid, "packed": hex::encode(packed) }))
}

pub fn unpack<C: ScriptClassifier>(parser: &TxParser<C>, packed: &[u8]) -> Result<Value, Error> {
    let (tx, height) = parser.unpack_tx(packed)?;
    Ok(json!({ "height": height, "tx": tx }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix_primitives::NetworkParams;
    use nix_script::NixScriptClassifier;

    const TX_HEX: &str = "0100000001f85264d11a747bdba77d411e5e4a3d35e3aeb5843b34a95234a2121ac65496bd000000006b483045022100dfa158fbd9773fab4f6f329c807e040af0c3a40967cbe01667169b914ed5ad960220061c5876364caa3e3c9c990ad2b4cc8b1a53d4f954dbda8434b0e67cc8348ff6012103093865e1e132b33a2a5ed01c79d2edba3473826a66cb26b8311bfa42749c2190ffffffff02ec3f8a2a010000001976a91470dcef2a22575d7a8f0779fb1d6cdd48135bd22788ac3116491d000000001976a91471348f7780e955a2a60eba17ecc4c826ebc23a9888ac00000000";

    #[test]
    fn test_pack_then_unpack() {
        let parser = TxParser::with_classifier(NixScriptClassifier::new(NetworkParams::MAINNET));
        let raw = hex::decode(TX_HEX).unwrap();

        let packed = pack(&parser, &raw, 12345, 1_600_000_000).unwrap();
        assert_eq!(
            packed["txid"],
            "ed732a404cdfd4e0475a7a016200b7eef191f2c9de0ffdef8a20091c0499299c"
        );

        let record = hex::decode(packed["packed"].as_str().unwrap()).unwrap();
        let unpacked = unpack(&parser, &record).unwrap();
        assert_eq!(unpacked["height"], 12345);
        assert_eq!(unpacked["tx"]["block_time"], 1_600_000_000);
        assert_eq!(unpacked["tx"]["hex"], TX_HEX);
        assert_eq!(unpacked["tx"]["vout"][0]["value_sat"], "5008670700");
    }
}
