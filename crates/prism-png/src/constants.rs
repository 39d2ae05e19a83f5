/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// The eight byte signature every PNG stream must start with,
/// `137 80 78 71 13 10 26 10` read as one big endian integer.
pub const PNG_SIGNATURE: u64 = 0x8950_4e47_0d0a_1a0a;

/// Starting column of each Adam7 pass.
pub const ADAM7_X_START: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
/// Starting row of each Adam7 pass.
pub const ADAM7_Y_START: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];
/// Column increment of each Adam7 pass.
pub const ADAM7_X_STEP: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
/// Row increment of each Adam7 pass.
pub const ADAM7_Y_STEP: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];
