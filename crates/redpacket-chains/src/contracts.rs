use alloy::sol;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract RedPacket {
        struct Packet {
            address sender;
            uint256 totalAmount;
            uint256 remainingAmount;
            uint256 totalShares;
            uint256 remainingShares;
            bool isEqual;
        }

        error PacketNotFound(uint256 id);
        error PacketExhausted(uint256 id);

        event PacketCreated(uint256 indexed id, address indexed sender, uint256 amount, uint256 shares, bool isEqual);
        event PacketGrabbed(uint256 indexed id, address indexed grabber, uint256 amount);

        function createPacket(uint256 totalShares, bool isEqual) external payable returns (uint256 id);
        function grabPacket(uint256 id) external;
        function getPacket(uint256 id) external view returns (Packet memory);
        function packetCount() external view returns (uint256);
    }
}

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract Logger {
        event DataWritten(address indexed sender, uint256 value, string note);

        function writeData(uint256 value, string note) external;
    }
}
