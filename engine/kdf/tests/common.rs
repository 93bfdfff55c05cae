// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use hex::decode;
use json::{iterators::Members, JsonValue};

// extension for JsonValue
pub trait JsonValueExt {
    // decode string
    fn check_string(&self) -> String;
    // hex-decode string into byte vector
    fn check_bytes(&self) -> Vec<u8>;
    // check that the value is an array and iterate it
    fn check_array_iter(&self) -> Members;
    // get u32 if not null
    fn option_u32(&self, def: u32) -> u32;
}

impl JsonValueExt for JsonValue {
    fn check_string(&self) -> String {
        self.as_str().unwrap().to_string()
    }

    fn check_bytes(&self) -> Vec<u8> {
        let encoded = self.as_str().unwrap();

        decode(encoded).unwrap()
    }

    fn check_array_iter(&self) -> Members {
        assert!(self.is_array());
        self.members()
    }

    fn option_u32(&self, def: u32) -> u32 {
        if self.is_number() {
            self.as_u32().unwrap()
        } else {
            def
        }
    }
}

// result extension
pub trait ResultExt<T, E> {
    // unwraps the error and panics on success
    fn error_or(self, msg: impl ToString) -> E;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn error_or(self, msg: impl ToString) -> E {
        match self {
            Err(e) => e,
            _ => panic!("{}", msg.to_string()),
        }
    }
}
