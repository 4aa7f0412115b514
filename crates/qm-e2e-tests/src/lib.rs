//! End-to-end tests for the quest ledger live under `tests/`.
