// src/aliases.rs
//! secure-gate secret types used by the hybrid envelope

use secure_gate::fixed_alias;

// 256-bit per-file XChaCha20-Poly1305 key, wiped on drop
fixed_alias!(pub FileKey32, 32);
