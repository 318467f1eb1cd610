mod order_id;
mod webhook_signature;

pub use order_id::{generate_order_id, to_base36};
pub use webhook_signature::{
    sign_payload,
    signature_header,
    verify_webhook_signature,
    SignatureHeader,
    DEFAULT_SIGNATURE_TOLERANCE,
    SIGNATURE_HEADER,
};
