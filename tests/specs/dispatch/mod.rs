// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod pause;
mod recovery;
mod scheduling;
mod triage;
