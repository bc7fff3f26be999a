//! Reader for a stream of binary PPM (P6) frames, as written by
//! `ffmpeg -f image2pipe -vcodec ppm`.

use std::io;

use image::RgbImage;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on frame size, to reject a corrupt header before allocating.
const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Read the next frame. `Ok(None)` on a clean end of stream.
pub(crate) async fn read_ppm_frame<R>(reader: &mut R) -> io::Result<Option<RgbImage>>
where
    R: AsyncRead + Unpin,
{
    let Some(magic) = read_token(reader).await? else {
        return Ok(None);
    };
    if magic != "P6" {
        return Err(invalid(format!("unexpected PPM magic '{magic}'")));
    }
    let width = read_number(reader).await?;
    let height = read_number(reader).await?;
    let max_value = read_number(reader).await?;
    if max_value != 255 {
        return Err(invalid(format!("unsupported PPM max value {max_value}")));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 || pixels > MAX_PIXELS {
        return Err(invalid(format!("bad PPM dimensions {width}x{height}")));
    }

    let mut data = vec![0u8; (pixels * 3) as usize];
    reader.read_exact(&mut data).await?;
    RgbImage::from_raw(width, height, data)
        .map(Some)
        .ok_or_else(|| invalid("PPM buffer size mismatch"))
}

async fn read_number<R>(reader: &mut R) -> io::Result<u32>
where
    R: AsyncRead + Unpin,
{
    let token = read_token(reader)
        .await?
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
    token
        .parse()
        .map_err(|_| invalid(format!("bad PPM header field '{token}'")))
}

/// Next whitespace-delimited header token, skipping `#` comments. Consumes the
/// single whitespace byte that ends the token.
async fn read_token<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut token = Vec::new();
    loop {
        let byte = match reader.read_u8().await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && token.is_empty() => {
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        };
        if byte == b'#' && token.is_empty() {
            while reader.read_u8().await? != b'\n' {}
            continue;
        }
        if byte.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(byte);
        if token.len() > 16 {
            return Err(invalid("PPM header token too long"));
        }
    }
    String::from_utf8(token)
        .map(Some)
        .map_err(|_| invalid("PPM header is not ASCII"))
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}
