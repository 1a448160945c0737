// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

mod lifecycle;
