use std::collections::HashMap;

/// GPT-2 byte-level alphabet: every byte gets a printable stand-in char so
/// BPE merges never see raw whitespace or control bytes.
#[derive(Debug, Clone)]
pub struct ByteAlphabet {
    encoder: HashMap<u8, char>,
    decoder: HashMap<char, u8>,
}

impl ByteAlphabet {
    pub fn gpt2() -> Self {
        // printable latin-1 ranges map to themselves
        let mut bs: Vec<u32> = (u32::from(b'!')..=u32::from(b'~')).collect();
        bs.extend(0xA1..=0xAC);
        bs.extend(0xAE..=0xFF);

        let mut cs = bs.clone();
        let mut n = 0u32;
        for b in 0u32..=255 {
            if !bs.contains(&b) {
                bs.push(b);
                cs.push(256 + n);
                n += 1;
            }
        }

        let mut encoder = HashMap::with_capacity(256);
        let mut decoder = HashMap::with_capacity(256);
        for (b, c) in bs.into_iter().zip(cs) {
            // every value is below 0x200, always a valid scalar
            let Some(ch) = char::from_u32(c) else { continue };
            encoder.insert(b as u8, ch);
            decoder.insert(ch, b as u8);
        }
        Self { encoder, decoder }
    }

    pub fn encode(&self, piece: &str) -> String {
        piece.bytes().filter_map(|b| self.encoder.get(&b)).collect()
    }

    pub fn decode(&self, symbols: &str) -> Option<Vec<u8>> {
        symbols.chars().map(|c| self.decoder.get(&c).copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_all_bytes_and_round_trips_space() {
        let alpha = ByteAlphabet::gpt2();
        assert_eq!(alpha.encoder.len(), 256);
        assert_eq!(alpha.encode("hi"), "hi");
        // GPT-2 renders a leading space as 'Ġ'
        assert_eq!(alpha.encode(" a"), "\u{120}a");
        assert_eq!(alpha.decode("\u{120}a").unwrap(), b" a".to_vec());
    }
}
