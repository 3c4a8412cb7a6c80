//! Identifier hash for UOP directory entries
//!
//! UOP containers do not store entry names. Each directory entry carries a
//! 64-bit hash of its name instead, computed with a variant of Bob Jenkins'
//! lookup3 `hashlittle2()`. Ids can only be recovered by hashing every
//! candidate name and matching, so this function must stay bit-exact.
//!
//! Two details differ from the textbook lookup3:
//!
//! - Input bytes are widened as signed chars, so bytes `>= 0x80` are
//!   sign-extended before they are shifted into place. Entry names are ASCII
//!   in practice, where both readings agree.
//! - The result packs the two state words as `(b << 32) | c`.

/// Compute the 64-bit identifier hash of an entry name.
///
/// # Examples
///
/// ```
/// use uomulti_hash::identifier_hash;
///
/// assert_eq!(identifier_hash(""), 0xDEAD_BEEF_DEAD_BEEF);
/// assert_eq!(
///     identifier_hash("build/multicollection/000000.bin"),
///     0x665F_F35A_C79D_382B
/// );
/// ```
pub fn identifier_hash(name: impl AsRef<[u8]>) -> u64 {
    let key = name.as_ref();

    // The reference tool seeds from a 32-bit length.
    let seed = 0xdead_beef_u32.wrapping_add(key.len() as u32);
    let mut a = seed;
    let mut b = seed;
    let mut c = seed;
    let mut k = key;

    // Process 12-byte chunks; a full final chunk goes through the tail path
    while k.len() > 12 {
        a = a.wrapping_add(load_word(&k[0..4]));
        b = b.wrapping_add(load_word(&k[4..8]));
        c = c.wrapping_add(load_word(&k[8..12]));
        mix(&mut a, &mut b, &mut c);
        k = &k[12..];
    }

    if k.is_empty() {
        return pack(b, c);
    }

    // Tail of 1-12 bytes: byte i lands in word i / 4 at shift (i % 4) * 8
    for (i, &byte) in k.iter().enumerate() {
        let value = widen(byte).wrapping_shl(((i % 4) * 8) as u32);
        match i / 4 {
            0 => a = a.wrapping_add(value),
            1 => b = b.wrapping_add(value),
            _ => c = c.wrapping_add(value),
        }
    }

    final_mix(&mut a, &mut b, &mut c);
    pack(b, c)
}

/// Widen one input byte the way a signed `char` promotes to `int`.
fn widen(byte: u8) -> u32 {
    i32::from(byte as i8) as u32
}

/// Load four bytes as a little-endian word using signed widening.
fn load_word(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .enumerate()
        .fold(0u32, |word, (i, &byte)| {
            word.wrapping_add(widen(byte).wrapping_shl((i * 8) as u32))
        })
}

fn pack(b: u32, c: u32) -> u64 {
    (u64::from(b) << 32) | u64::from(c)
}

/// Mix 3 u32 values reversibly
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(4);
    *c = c.wrapping_add(*b);

    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(6);
    *a = a.wrapping_add(*c);

    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(8);
    *b = b.wrapping_add(*a);

    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(16);
    *c = c.wrapping_add(*b);

    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(19);
    *a = a.wrapping_add(*c);

    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(4);
    *b = b.wrapping_add(*a);
}

/// Final mixing of 3 u32 values
fn final_mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(14));

    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(11));

    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(25));

    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(16));

    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(4));

    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(14));

    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(24));
}
