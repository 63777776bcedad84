use anyhow::Result;
use clap::Parser;

use blockfs::fs::FileSystem;
use blockfs::layout::BLOCK_SIZE;

#[derive(Parser)]
struct Args {
    /// Total number of storage blocks in the simulated filesystem
    #[arg(long, default_value_t = 1024)]
    blocks: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut fs = FileSystem::new(args.blocks)?;
    let root = fs.root();

    let docs = fs.create_directory(root, "docs")?;
    let readme = fs.create_file(docs, "README.md")?;
    fs.write_file(readme, b"An in-memory block filesystem simulator.\n")?;

    let scratch = fs.create_file(root, "scratch.dat")?;
    fs.write_file(scratch, &vec![0xab; 3 * BLOCK_SIZE / 2])?;

    println!("contents of /:");
    for entry in fs.list_directory(root)? {
        println!("  {}\t(inode #{})", entry.name, entry.inum);
    }

    print!("{}", String::from_utf8_lossy(&fs.read_file(readme)?));

    fs.delete_file(root, "scratch.dat")?;

    let stats = fs.stats();
    println!(
        "{}/{} blocks free, {}/{} inodes free",
        stats.free_blocks, stats.total_blocks, stats.free_inodes, stats.total_inodes
    );

    fs.check_consistency()?;

    Ok(())
}
