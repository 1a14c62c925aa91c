//! Custom-script payload
//!
//! The script writes a timestamped log under `/tmp` and appends to it for 75
//! seconds, which makes an extension run easy to spot on the instance.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const PROVISIONING_SCRIPT: &str = r#"
filepath="/tmp/test-$(date +"%m-%d-%Y-%T").log"
echo "hello" > $filepath
for i in 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15; do
  sleep 5
  echo "$i: waited 5 secs" >> $filepath
done"#;

/// Standard base64 of a script, as the extension's protected `script` setting
pub fn encode_script(script: &str) -> String {
    STANDARD.encode(script.as_bytes())
}

pub fn encoded_provisioning_script() -> String {
    encode_script(PROVISIONING_SCRIPT)
}
