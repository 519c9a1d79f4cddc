//! # SnoRelax CLI Ask / Repl Integration Tests
//!
//! File: cli/tests/ask.rs
//!
//! One-shot replies from arguments and stdin, the interactive loop, and the
//! `chat_memory.json` file they append to. No API keys are set, so unmatched
//! messages get the placeholder reply.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_ask_rule_reply_from_args() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["ask", "how", "are", "you?"])
        .assert()
        .success()
        .stdout("I'm just a bot, but I'm here to help!\n");
}

#[test]
fn test_ask_reads_stdin() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("ask")
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("Hello! How can I help you today?\n");
}

#[test]
fn test_ask_blank_stdin_prints_nothing() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("ask")
        .write_stdin("   \n")
        .assert()
        .success()
        .stdout("");
    assert!(!sandbox.data_file("chat_memory.json").exists());
}

#[test]
fn test_ask_without_keys_uses_placeholder() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["ask", "tell me about the moon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("placeholder bot"));
}

#[test]
fn test_ask_appends_chat_memory() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["ask", "hi"]).assert().success();
    sandbox.cmd().args(["ask", "bye"]).assert().success();

    let memory = read_json(&sandbox.data_file("chat_memory.json"));
    let records = memory.as_array().expect("chat memory is an array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["user"], "hi");
    assert_eq!(records[1]["bot"], "Goodbye! Have a great day!");
    assert!(records[1]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_ask_no_history_flag() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["ask", "--no-history", "hi"])
        .assert()
        .success();
    assert!(!sandbox.data_file("chat_memory.json").exists());
}

#[test]
fn test_ask_intents_engine_without_model_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["ask", "--engine", "intents", "hi"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("snorelax intents init"));
}

#[test]
fn test_repl_conversation_until_exit() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["repl", "--engine", "rules"])
        .write_stdin("hello\n\nwhat is your name\nexit\nhello again\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("SnoRelax Bot is ready. Type 'exit' to quit."))
        .stdout(predicate::str::contains("Bot: Hello! How can I help you today?"))
        .stdout(predicate::str::contains("Bot: I'm SnoRelax Bot."))
        .stdout(predicate::str::contains("hello again").not());

    let memory = read_json(&sandbox.data_file("chat_memory.json"));
    assert_eq!(memory.as_array().unwrap().len(), 2);
}

#[test]
fn test_repl_remote_without_key_reports_inline() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["repl", "--engine", "remote", "--no-history"])
        .write_stdin("hf: hello\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type 'cohere:' or 'hf:'"))
        .stdout(predicate::str::contains("[HF error: HF_API_KEY not set]"));
}
