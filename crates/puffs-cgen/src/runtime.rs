//! Fixed C boilerplate shared by every generated package.
//!
//! The base header declares the built-in types that field and parameter
//! types map onto (see [`crate::types`]); the base implementation holds
//! small helpers used by generated function bodies. Neither depends on the
//! package being generated, except for the compiled-in version token.

use crate::buffer::Buffer;

const BASE_HEADER_TOP: &str = "\
#ifndef PUFFS_BASE_HEADER_H
#define PUFFS_BASE_HEADER_H

// Puffs assumes that:
//  - converting a uint32_t to a size_t will never overflow.
//  - converting a size_t to a uint64_t will never overflow.
#ifdef __WORDSIZE
#if (__WORDSIZE != 32) && (__WORDSIZE != 64)
#error \"Puffs requires a word size of either 32 or 64 bits\"
#endif
#endif

#include <stdbool.h>
#include <stdint.h>
#include <string.h>

";

const BASE_HEADER_BOTTOM: &str = "\
// puffs_base_slice_u8 is a 1-dimensional buffer (a pointer and length).
//
// A value with all fields NULL or zero is a valid, empty slice.
typedef struct {
  uint8_t* ptr;
  size_t len;
} puffs_base_slice_u8;

// puffs_base_buf1 is a 1-dimensional buffer (a pointer and length), plus
// additional indexes into that buffer, plus an opened / closed flag.
//
// A value with all fields NULL or zero is a valid, empty buffer.
typedef struct {
  uint8_t* ptr;  // Pointer.
  size_t len;    // Length.
  size_t wi;     // Write index. Invariant: wi <= len.
  size_t ri;     // Read  index. Invariant: ri <= wi.
  bool closed;   // No further writes are expected.
} puffs_base_buf1;

// puffs_base_buf2 is a 2-dimensional buffer (a pointer, width, height and
// stride), plus an opened / closed flag.
//
// Row y starts at ptr + (y * stride). Invariant: width <= stride.
//
// A value with all fields NULL or zero is a valid, empty buffer.
typedef struct {
  uint8_t* ptr;   // Pointer.
  size_t width;   // Bytes per row.
  size_t height;  // Number of rows.
  size_t stride;  // Bytes between the start of consecutive rows.
  bool closed;    // No further writes are expected.
} puffs_base_buf2;

#endif  // PUFFS_BASE_HEADER_H

";

const BASE_IMPL: &str = "\
#ifndef PUFFS_BASE_IMPL_H
#define PUFFS_BASE_IMPL_H

// Use switch cases for coroutine state, similar to the technique in
// https://www.chiark.greenend.org.uk/~sgtatham/coroutines.html
//
// We use a trivial macro instead of an explicit assignment and case statement
// so that clang-format doesn't get confused by the unusual \"case\"s.
#define PUFFS_COROUTINE_STATE(n) \\
  coro_state = n;                \\
  case n:

#define PUFFS_LOW_BITS(x, n) ((x) & ((1 << (n)) - 1))

#define PUFFS_IGNORE_POTENTIALLY_UNUSED_VARIABLE(x) (void)(x)

static inline uint16_t puffs_base_load_u16be(uint8_t* p) {
  return ((uint16_t)(p[0]) << 8) | ((uint16_t)(p[1]) << 0);
}

static inline uint16_t puffs_base_load_u16le(uint8_t* p) {
  return ((uint16_t)(p[0]) << 0) | ((uint16_t)(p[1]) << 8);
}

static inline uint32_t puffs_base_load_u32be(uint8_t* p) {
  return ((uint32_t)(p[0]) << 24) | ((uint32_t)(p[1]) << 16) |
         ((uint32_t)(p[2]) << 8) | ((uint32_t)(p[3]) << 0);
}

static inline uint32_t puffs_base_load_u32le(uint8_t* p) {
  return ((uint32_t)(p[0]) << 0) | ((uint32_t)(p[1]) << 8) |
         ((uint32_t)(p[2]) << 16) | ((uint32_t)(p[3]) << 24);
}

#endif  // PUFFS_BASE_IMPL_H

";

/// The base header, with `PUFFS_VERSION` set to `version`.
pub fn write_base_header(out: &mut Buffer, version: u32) {
    out.writes(BASE_HEADER_TOP);
    out.writes("// PUFFS_VERSION is the ABI version token passed to every constructor.\n");
    printf!(out, "#define PUFFS_VERSION (0x{version:05X})\n\n");
    out.writes(BASE_HEADER_BOTTOM);
}

pub fn write_base_impl(out: &mut Buffer) {
    out.writes(BASE_IMPL);
}
