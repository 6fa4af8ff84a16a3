/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod category;
pub use category::{Category, ParseCategoryError};

mod tag;
pub use tag::TagMap;

mod value;
pub use value::{DataType, FieldValue};

mod point;
pub use point::{Point, PointBuilder, PointError};

mod line_proto;
pub use line_proto::{DisplayLineProto, encode_lines};
