use crate::error::{FeedError, FeedResult};
use crate::keys::{PublicKey, SecretKey, Signature};

/// Maximum size of an encoded feed in bytes.
///
/// Bounds both decoding and any buffer a transport allocates to receive
/// feed bytes from an untrusted peer.
pub const MAX_FEED_SIZE: usize = 1024 * 1024;

/// Magic bytes prefixing an encoded feed.
const MAGIC: &[u8; 4] = b"PIC0";

/// One signed unit of opaque body bytes.
///
/// The signed message is the previous block's signature (64 zero bytes for
/// the genesis block) followed by the body, so blocks cannot be reordered
/// or transplanted between feeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Signer public key. Identical for every block in a feed.
    pub key: PublicKey,
    /// Signature over `prev ++ body`.
    pub signature: Signature,
    /// Previous block's signature, `None` for genesis.
    pub prev: Option<Signature>,
    /// Opaque body bytes.
    pub body: Vec<u8>,
}

impl Block {
    /// Body size in bytes.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    fn signed_message(prev: Option<&Signature>, body: &[u8]) -> Vec<u8> {
        let mut msg = Vec::with_capacity(64 + body.len());
        match prev {
            Some(sig) => msg.extend_from_slice(sig.as_bytes()),
            None => msg.extend_from_slice(&[0u8; 64]),
        }
        msg.extend_from_slice(body);
        msg
    }

    /// Verify this block's signature.
    pub fn verify(&self) -> FeedResult<()> {
        let msg = Self::signed_message(self.prev.as_ref(), &self.body);
        self.key.verify(&msg, &self.signature)
    }
}

/// An append-only sequence of signed blocks under one signer identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feed {
    blocks: Vec<Block>,
}

impl Feed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Sign `body` with `secret` and append the resulting block.
    pub fn append(&mut self, body: Vec<u8>, secret: &SecretKey) -> &Block {
        let prev = self.blocks.last().map(|b| b.signature);
        let msg = Block::signed_message(prev.as_ref(), &body);
        let signature = secret.sign(&msg);
        self.blocks.push(Block {
            key: secret.public_key(),
            signature,
            prev,
            body,
        });
        self.blocks.last().expect("just pushed")
    }

    /// The latest block, if any.
    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// All blocks in append order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append already-signed blocks, verifying each links onto the current
    /// last block and carries the feed's signer key.
    pub fn extend(&mut self, blocks: &[Block]) -> FeedResult<()> {
        for block in blocks {
            let index = self.blocks.len();
            if block.prev != self.blocks.last().map(|b| b.signature) {
                return Err(FeedError::BrokenChain { index });
            }
            if self.blocks.first().is_some_and(|first| first.key != block.key) {
                return Err(FeedError::InvalidKey);
            }
            block
                .verify()
                .map_err(|_| FeedError::BadSignature { index })?;
            self.blocks.push(block.clone());
        }
        Ok(())
    }

    /// Verify every signature, the prev-chain between blocks, and that one
    /// key signed the whole feed.
    pub fn verify(&self) -> FeedResult<()> {
        for (i, block) in self.blocks.iter().enumerate() {
            block.verify().map_err(|_| FeedError::BadSignature { index: i })?;
            let expected_prev = if i == 0 {
                None
            } else {
                Some(self.blocks[i - 1].signature)
            };
            if block.prev != expected_prev {
                return Err(FeedError::BrokenChain { index: i });
            }
            if block.key != self.blocks[0].key {
                return Err(FeedError::InvalidKey);
            }
        }
        Ok(())
    }

    /// Encode to a contiguous byte buffer.
    ///
    /// Layout: magic, then per block: key(32) ‖ signature(64) ‖
    /// prev-flag(1) ‖ prev(64, when flagged) ‖ body-len(u32 BE) ‖ body.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MAGIC.len() + self.blocks.len() * 165);
        buf.extend_from_slice(MAGIC);
        for block in &self.blocks {
            buf.extend_from_slice(block.key.as_bytes());
            buf.extend_from_slice(block.signature.as_bytes());
            match &block.prev {
                Some(prev) => {
                    buf.push(1);
                    buf.extend_from_slice(prev.as_bytes());
                }
                None => buf.push(0),
            }
            buf.extend_from_slice(&(block.body.len() as u32).to_be_bytes());
            buf.extend_from_slice(&block.body);
        }
        buf
    }

    /// Decode and verify a feed from a byte buffer.
    ///
    /// A feed that fails signature or chain verification never comes into
    /// existence on this side.
    pub fn decode(data: &[u8]) -> FeedResult<Self> {
        if data.len() > MAX_FEED_SIZE {
            return Err(FeedError::TooLarge {
                size: data.len(),
                max: MAX_FEED_SIZE,
            });
        }
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(FeedError::BadMagic);
        }

        let mut blocks = Vec::new();
        let mut pos = MAGIC.len();
        while pos < data.len() {
            let key = PublicKey::from_slice(take(data, &mut pos, 32)?)?;
            let signature = Signature::from_bytes(
                take(data, &mut pos, 64)?.try_into().expect("fixed width"),
            );
            let flagged = take(data, &mut pos, 1)?[0] != 0;
            let prev = if flagged {
                Some(Signature::from_bytes(
                    take(data, &mut pos, 64)?.try_into().expect("fixed width"),
                ))
            } else {
                None
            };
            let len =
                u32::from_be_bytes(take(data, &mut pos, 4)?.try_into().expect("fixed width"))
                    as usize;
            let body = take(data, &mut pos, len)?.to_vec();
            blocks.push(Block {
                key,
                signature,
                prev,
                body,
            });
        }

        let feed = Self { blocks };
        feed.verify()?;
        Ok(feed)
    }
}

fn take<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> FeedResult<&'a [u8]> {
    let end = pos.checked_add(len).ok_or(FeedError::Truncated)?;
    if end > data.len() {
        return Err(FeedError::Truncated);
    }
    let slice = &data[*pos..end];
    *pos = end;
    Ok(slice)
}
