// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for the `/cmd` contract, using an executor that echoes the
//! request instead of spawning processes.

use async_trait::async_trait;
use cmdsrv_core::{CmdResponse, ExecError, ExecutionRequest, ExecutionResult, Executor};
use cmdsrv_daemon::handler::{UNSUPPORTED_MEDIA_TYPE_MSG, handle_execute, validate};
use cmdsrv_error::ApiError;
use proptest::prelude::*;

struct Echo;

#[async_trait]
impl Executor for Echo {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ExecError> {
        Ok(ExecutionResult {
            command: request.clone(),
            stdout: request.to_string().into_bytes(),
            stderr: Vec::new(),
            exit_code: request.args().len() as i32,
        })
    }
}

fn run(body: &[u8], content_type: Option<&str>) -> Result<ExecutionResult, ApiError> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(handle_execute(body, content_type, &Echo))
}

fn arb_cmd() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(any::<String>(), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn valid_cmd_is_echoed_verbatim(cmd in arb_cmd()) {
        let body = serde_json::to_vec(&serde_json::json!({ "cmd": cmd })).unwrap();
        let result = run(&body, Some("application/json")).unwrap();
        let resp = CmdResponse::from(result);
        prop_assert_eq!(&resp.cmd, &cmd);
        prop_assert_eq!(resp.retval, cmd.len() as i32 - 1);
        prop_assert_eq!(resp.stdout, cmd.join(" "));
    }

    #[test]
    fn extra_fields_are_ignored(cmd in arb_cmd(), extra in "[a-z]{1,8}") {
        prop_assume!(extra != "cmd");
        let body = serde_json::to_vec(&serde_json::json!({ "cmd": cmd, extra: 1 })).unwrap();
        let request = validate(&body, Some("application/json")).unwrap();
        prop_assert_eq!(request.as_slice(), cmd.as_slice());
    }

    #[test]
    fn non_json_content_type_always_rejected(
        ct in "[a-z]{1,10}/[a-z+.-]{1,12}",
        cmd in arb_cmd(),
    ) {
        prop_assume!(ct != "application/json");
        let body = serde_json::to_vec(&serde_json::json!({ "cmd": cmd })).unwrap();
        let err = validate(&body, Some(&ct)).unwrap_err();
        prop_assert_eq!(err, ApiError::client(UNSUPPORTED_MEDIA_TYPE_MSG));
    }

    #[test]
    fn arbitrary_bytes_never_yield_server_errors(body in prop::collection::vec(any::<u8>(), 0..256)) {
        match run(&body, Some("application/json")) {
            Ok(result) => prop_assert!(!result.command.as_slice().is_empty()),
            Err(err) => prop_assert_eq!(err.status(), 400),
        }
    }

    #[test]
    fn non_string_elements_are_rejected(n in any::<i64>(), head in "[a-z]{1,6}") {
        let body = serde_json::to_vec(&serde_json::json!({ "cmd": [head, n] })).unwrap();
        let err = validate(&body, Some("application/json")).unwrap_err();
        prop_assert_eq!(err.status(), 400);
    }
}
