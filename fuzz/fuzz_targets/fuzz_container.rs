#![no_main]

use libfuzzer_sys::fuzz_target;
use morphpack::metadata::decode_key;
use morphpack::reader::NeuronReader;
use morphpack::record::RecordId;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must be rejected with an error, never a panic
    if let Ok(reader) = NeuronReader::from_bytes(data.to_vec().into()) {
        let _ = reader.ids();
        let _ = reader.read_ids(&[RecordId::Int(1), RecordId::from("1")]);
        let _ = reader.record_metadata(None);
        for name in reader.secondary_names() {
            let _ = reader.read_secondary(&name);
        }
    }

    if let Ok(key) = std::str::from_utf8(data) {
        let _ = decode_key(key);
    }
});
