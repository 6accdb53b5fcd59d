// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for [`ExecutionRequest`] construction and its wire form.

use cmdsrv_core::{CmdRequest, CmdResponse, ExecutionRequest, ExecutionResult};
use proptest::prelude::*;

fn arb_parts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(any::<String>(), 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_non_empty_vector_is_accepted(parts in arb_parts()) {
        let req = ExecutionRequest::try_from(parts.clone()).unwrap();
        prop_assert_eq!(req.program(), parts[0].as_str());
        prop_assert_eq!(req.args(), &parts[1..]);
        prop_assert_eq!(req.to_string(), parts.join(" "));
    }

    #[test]
    fn wire_form_preserves_order(parts in arb_parts()) {
        let req = ExecutionRequest::new(parts.clone()).unwrap();
        let json = serde_json::to_string(&CmdRequest { cmd: req.clone() }).unwrap();
        let back: CmdRequest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.cmd, req);
    }

    #[test]
    fn response_echoes_command(parts in arb_parts(), code in any::<i32>()) {
        let resp = CmdResponse::from(ExecutionResult {
            command: ExecutionRequest::new(parts.clone()).unwrap(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: code,
        });
        prop_assert_eq!(&resp.cmd, &parts);
        prop_assert_eq!(resp.retval, code);
    }
}

#[test]
fn empty_vector_is_rejected() {
    assert!(ExecutionRequest::try_from(Vec::<String>::new()).is_err());
}
